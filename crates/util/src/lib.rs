pub mod links;
pub mod session;
pub mod text;

pub use links::{href_to_rel_path, is_external, is_fragment, normalize_rel_href, path_to_root, rewrite_href};
pub use text::truncate_with_ellipsis;
pub use session::{
    InMemorySessionStore, JsonSessionStore, SESSION_FILE_NAME, SESSION_PATH_ENV, SessionStore, SessionStoreError,
};
