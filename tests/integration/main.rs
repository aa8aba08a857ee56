//! Integration tests for the folder tree service over the in-memory store.

mod helpers;

mod authz_test;
mod children_test;
mod mutation_test;
mod resolve_test;
mod search_test;
