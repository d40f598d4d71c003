//! API endpoint handlers

pub mod daily;
pub mod generate;
pub mod health;
pub mod personality;
pub mod phased;
pub mod rooms;

pub use daily::daily_routes;
pub use generate::generation_routes;
pub use health::health_routes;
pub use personality::personality_routes;
pub use phased::phased_routes;
pub use rooms::room_routes;
