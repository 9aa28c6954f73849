use crate::{PageNumber, VulnerabilityEntry, PAGE_SIZE};

pub const DEMO_PATH_PREFIX: &str = "/vulnerability/ZD-2024-";

const DEMO_TITLES: [&str; 5] = [
    "Stored XSS in admin dashboard",
    "SQL injection in search endpoint",
    "Broken access control on file download",
    "Sensitive information disclosure via backup file",
    "Remote code execution through unsafe upload",
];

/// Placeholder entries for `page`: ids `(page-1)*20+1 ..= page*20`.
/// Deterministic and pure; never touches the network.
pub fn synthesize_demo(page: PageNumber, base_origin: &str) -> Vec<VulnerabilityEntry> {
    let page = page.max(1) as u64;
    let first = (page - 1) * PAGE_SIZE as u64;

    (1..=PAGE_SIZE as u64)
        .map(|offset| {
            let id = first + offset;
            let kind = DEMO_TITLES[(id as usize - 1) % DEMO_TITLES.len()];
            VulnerabilityEntry::new(
                base_origin,
                format!("{DEMO_PATH_PREFIX}{id:05}"),
                format!("[DEMO] ZD-2024-{id:05} {kind}"),
            )
        })
        .collect()
}

/// Recovers the numeric id from a demo entry's path.
pub fn demo_id(entry: &VulnerabilityEntry) -> Option<u64> {
    entry.path().strip_prefix(DEMO_PATH_PREFIX)?.parse().ok()
}
