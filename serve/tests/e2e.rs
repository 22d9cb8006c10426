//! End-to-end HTTP tests against a real bound server, mirroring the teacher's
//! `serve/tests/e2e` layout (one file per scenario, shared setup in `common`).

mod e2e {
    mod chat_flow;
    mod common;
    mod search_and_index;
    mod stream;
}
