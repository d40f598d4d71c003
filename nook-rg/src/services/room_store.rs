//! In-memory room store
//!
//! Keyed store of generated room records, alive for the process lifetime.
//! Only `create` mutates the map; readers never do. Ids are 8-character
//! random tokens; collisions are accepted as negligible at this scale and
//! are not retried.

use chrono::Utc;
use nook_common::types::{NormalizedBox, RoomRecord};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const ROOM_ID_LENGTH: usize = 8;
const ROOM_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Fields supplied when creating a room.
#[derive(Debug, Default)]
pub struct NewRoom {
    pub seed: i64,
    pub image_url: String,
    pub boxes: Option<Vec<NormalizedBox>>,
    pub product_ids: Option<Vec<String>>,
    pub personality_type: Option<String>,
    pub theme: Option<serde_json::Value>,
}

/// Shared in-memory room store
#[derive(Clone, Default)]
pub struct RoomStore {
    rooms: Arc<RwLock<HashMap<String, RoomRecord>>>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new room and return its generated id.
    pub async fn create(&self, new_room: NewRoom) -> String {
        let id = room_id();
        let record = RoomRecord {
            id: id.clone(),
            seed: new_room.seed,
            image_url: new_room.image_url,
            boxes: new_room.boxes,
            product_ids: new_room.product_ids,
            personality_type: new_room.personality_type,
            theme: new_room.theme,
            created_at: Utc::now().timestamp_millis(),
        };
        self.rooms.write().await.insert(id.clone(), record);
        id
    }

    pub async fn get(&self, id: &str) -> Option<RoomRecord> {
        self.rooms.read().await.get(id).cloned()
    }

    /// Share token for a room. Currently the token is the room id itself;
    /// a signed or expiring scheme belongs to a future auth service.
    pub async fn issue_share_token(&self, id: &str) -> Option<String> {
        self.rooms.read().await.get(id).map(|room| room.id.clone())
    }
}

fn room_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_ID_LENGTH)
        .map(|_| {
            let index = rng.gen_range(0..ROOM_ID_ALPHABET.len());
            ROOM_ID_ALPHABET[index] as char
        })
        .collect()
}
