mod roulette_room;
mod state;

pub use roulette_room::RouletteRoom;
pub use state::{RoomState, RoomStatePatch, SpinOutcome, CHAT_HISTORY_LIMIT};
