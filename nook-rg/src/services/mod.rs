//! Pipeline components and external-service clients

pub mod base_room;
pub mod compose;
pub mod daily;
pub mod fetch;
pub mod openai;
pub mod personality;
pub mod room_store;
pub mod stylize;

pub use compose::ComposeError;
pub use daily::DailyError;
pub use fetch::{FetchError, FetchedImage, ImageFetcher};
pub use openai::{OpenAiClient, OpenAiError};
pub use personality::InferenceError;
pub use room_store::{NewRoom, RoomStore};
pub use stylize::StylizeError;
