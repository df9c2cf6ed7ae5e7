pub mod sidebar_component;
pub mod state;

pub use sidebar_component::SidebarComponent;
pub use state::SidebarState;
