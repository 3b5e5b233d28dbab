//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::sync::Mutex;

use datos_core::Reporter;

/// Reporter that keeps messages in memory for assertions.
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Detail page carrying the machine-readable anchor and optional topic links.
pub fn detail_page(json_href: &str, topics: &[&str]) -> String {
    let topic_links: String = topics
        .iter()
        .map(|slug| format!(r#"<a href="/topics/{slug}">{slug}</a>"#))
        .collect();
    format!(
        r#"<html><body>
<div class="field-name-field-topic">{topic_links}</div>
<a href="{json_href}" title="json view of content">JSON</a>
</body></html>"#
    )
}
