use uuid::Uuid;

/// Generates a room name in the `interview-<8 hex>` form used by the real-time layer.
pub fn new_room_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("interview-{}", &id[..8])
}
