//! Single narration channel.
//!
//! FIFO queue drained one utterance at a time, with consecutive-duplicate
//! suppression, a minimum gap between utterance starts and deferral while
//! the platform speech engine is busy.

use std::collections::VecDeque;

use sortie_core::constants::*;

#[derive(Debug, Clone, Default)]
pub struct VoiceQueue {
    queue: VecDeque<String>,
    last_enqueued: Option<String>,
    last_start_ms: Option<f64>,
    speaking_until_ms: f64,
}

/// Estimated speaking time of a line.
pub fn estimate_speech_ms(text: &str) -> f64 {
    SPEECH_BASE_MS + SPEECH_MS_PER_CHAR * text.chars().count() as f64
}

impl VoiceQueue {
    /// Queue a line. Blank lines and repeats of the previous line are dropped.
    pub fn enqueue(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.last_enqueued.as_deref() == Some(text) {
            return false;
        }
        self.last_enqueued = Some(text.to_string());
        self.queue.push_back(text.to_string());
        true
    }

    /// Drop everything queued and put `text` next in line, even if it repeats
    /// the previous line. Returns false only for a blank line.
    pub fn preempt(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.queue.clear();
        self.last_enqueued = Some(text.to_string());
        self.queue.push_back(text.to_string());
        true
    }

    /// Start the next line if the channel is free.
    pub fn poll(&mut self, now_ms: f64, engine_busy: bool) -> Option<String> {
        if engine_busy || now_ms < self.speaking_until_ms {
            return None;
        }
        if self
            .last_start_ms
            .is_some_and(|t| now_ms - t < SPEECH_COOLDOWN_MS)
        {
            return None;
        }
        let text = self.queue.pop_front()?;
        self.last_start_ms = Some(now_ms);
        self.speaking_until_ms = now_ms + estimate_speech_ms(&text);
        Some(text)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.last_enqueued = None;
    }
}
