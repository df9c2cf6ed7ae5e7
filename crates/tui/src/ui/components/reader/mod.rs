pub mod reader_component;
pub mod state;

pub use reader_component::ReaderComponent;
pub use state::ReaderState;
