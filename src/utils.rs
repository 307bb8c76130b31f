use uuid::Uuid;

const SHORT_ID_LEN: usize = 5;

/// First characters of an id followed by `...`, as shown in tables.
pub fn short_id(id: &Uuid) -> String {
    let full = id.to_string();
    format!("{}...", &full[..SHORT_ID_LEN])
}
