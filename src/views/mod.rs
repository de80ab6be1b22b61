pub mod chat;
pub mod detector;
pub mod home;
pub mod resources;
pub mod shared;

pub use chat::ChatView;
pub use detector::DetectorView;
pub use home::HomeView;
pub use resources::ResourcesView;
