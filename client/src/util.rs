use daybook_shared::StickerId;
use uuid::Uuid;

pub fn make_id() -> StickerId {
    StickerId::new(Uuid::new_v4().to_string())
}
