use crate::models::TopicSelection;

pub const MATH_TOPICS: [&str; 8] = [
    "Bilangan & Operasi",
    "Aljabar Dasar",
    "Geometri",
    "Pengukuran",
    "Data & Statistik",
    "Pecahan",
    "KPK & FPB",
    "Logika Angka",
];

pub const LANGUAGE_TOPICS: [&str; 7] = [
    "Teks Sastra",
    "Teks Informasi",
    "Ide Pokok",
    "Ejaan & Tata Bahasa",
    "Kosakata",
    "Struktur Kalimat",
    "Analisis Puisi",
];

/// Retained snapshot cap. When exceeded the oldest snapshot is evicted.
pub const HISTORY_CAP: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicCategory {
    Math,
    Indonesian,
}

fn default_selection() -> TopicSelection {
    TopicSelection {
        math: vec!["Bilangan & Operasi".to_string(), "Pecahan".to_string()],
        indonesian: vec!["Teks Sastra".to_string(), "Ide Pokok".to_string()],
    }
}

/// Linear undo/redo log over topic selections. Snapshots are immutable once
/// created; toggling always derives a new snapshot from the current one and
/// discards any redo tail.
#[derive(Debug)]
pub struct TopicHistory {
    snapshots: Vec<TopicSelection>,
    index: usize,
    frozen: bool,
}

impl Default for TopicHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicHistory {
    pub fn new() -> Self {
        Self {
            snapshots: vec![default_selection()],
            index: 0,
            frozen: false,
        }
    }

    pub fn current(&self) -> &TopicSelection {
        &self.snapshots[self.index]
    }

    /// Locks the selection once the user has a completed attempt.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Adds the topic if absent, removes it if present. No-op while frozen.
    pub fn toggle(&mut self, category: TopicCategory, topic: &str) {
        if self.frozen {
            return;
        }

        let mut next = self.current().clone();
        let list = match category {
            TopicCategory::Math => &mut next.math,
            TopicCategory::Indonesian => &mut next.indonesian,
        };
        if let Some(pos) = list.iter().position(|t| t == topic) {
            list.remove(pos);
        } else {
            list.push(topic.to_string());
        }

        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(next);
        if self.snapshots.len() > HISTORY_CAP {
            self.snapshots.remove(0);
        }
        self.index = self.snapshots.len() - 1;
    }

    pub fn undo(&mut self) {
        if self.index > 0 {
            self.index -= 1;
        }
    }

    pub fn redo(&mut self) {
        if self.index < self.snapshots.len() - 1 {
            self.index += 1;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index < self.snapshots.len() - 1
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.snapshots.len()
    }
}
