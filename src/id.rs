use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ITEM_ID_LEN: usize = 9;

fn to_base36(bytes: &[u8], len: usize) -> String {
    let mut result = String::with_capacity(len);
    for i in 0..len {
        let idx = bytes[i % bytes.len()] as usize % 36;
        result.push(BASE36[idx] as char);
    }
    result
}

/// Random-looking 9-character base36 id for an item, unique among `existing_ids`.
pub fn generate_item_id(name: &str, existing_ids: &[&str]) -> String {
    for nonce in 0u32.. {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or(0).to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        let hash = hasher.finalize();
        let id = to_base36(&hash, ITEM_ID_LEN);
        if !existing_ids.contains(&id.as_str()) {
            return id;
        }
    }
    unreachable!()
}

/// List ids are the creation time in epoch milliseconds, bumped until unique.
pub fn generate_list_id(now: DateTime<Utc>, existing_ids: &[&str]) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let id = millis.to_string();
        if !existing_ids.contains(&id.as_str()) {
            return id;
        }
        millis += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn item_id_is_nine_base36_chars() {
        let id = generate_item_id("Cups", &[]);
        assert_eq!(id.len(), 9);
        assert!(id.bytes().all(|b| BASE36.contains(&b)), "{id}");
    }

    #[test]
    fn item_id_avoids_existing() {
        let mut ids: Vec<String> = Vec::new();
        for _ in 0..50 {
            let existing: Vec<&str> = ids.iter().map(|s| s.as_str()).collect();
            let id = generate_item_id("Cups", &existing);
            assert!(!ids.contains(&id));
            ids.push(id);
        }
    }

    #[test]
    fn list_id_is_epoch_millis() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        assert_eq!(generate_list_id(now, &[]), now.timestamp_millis().to_string());
    }

    #[test]
    fn list_id_bumped_on_collision() {
        let now = Utc.timestamp_millis_opt(1000).unwrap();
        assert_eq!(generate_list_id(now, &["1000", "1001"]), "1002");
    }
}
