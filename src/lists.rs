use crate::models::{Distraction, ItemId, Quest};
use chrono::{DateTime, Utc};

/// An entry of an ordered, user-edited list.
pub trait ListItem {
    fn create(content: String, now: DateTime<Utc>) -> Self;
    fn id(&self) -> &ItemId;
    /// Flips the item's done flag and returns the new value.
    fn toggle(&mut self) -> bool;
}

impl ListItem for Quest {
    fn create(title: String, now: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::generate("quest"),
            title,
            completed: false,
            progress: 0,
            created_at: now,
        }
    }

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.progress = if self.completed { 100 } else { 0 };
        self.completed
    }
}

impl ListItem for Distraction {
    fn create(text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::generate("distraction"),
            text,
            crossed: false,
            created_at: now,
        }
    }

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn toggle(&mut self) -> bool {
        self.crossed = !self.crossed;
        self.crossed
    }
}

/// Items kept in insertion order. Operations on unknown ids leave the list
/// untouched and report that nothing happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemList<T> {
    items: Vec<T>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: ListItem> ItemList<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn add(&mut self, content: &str, now: DateTime<Utc>) -> Option<&T> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        self.items.push(T::create(content.to_string(), now));
        self.items.last()
    }

    pub fn toggle(&mut self, id: &ItemId) -> Option<bool> {
        self.get_mut(id).map(T::toggle)
    }

    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    pub fn get(&self, id: &ItemId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn get_mut(&mut self, id: &ItemId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemList<Quest> {
    /// Clamps `value` to 0..=100 and returns the resulting `completed` flag.
    pub fn set_progress(&mut self, id: &ItemId, value: i32) -> Option<bool> {
        let quest = self.get_mut(id)?;
        quest.progress = value.clamp(0, 100) as u8;
        quest.completed = quest.progress == 100;
        Some(quest.completed)
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|q| q.completed).count()
    }
}

impl ItemList<Distraction> {
    pub fn crossed_count(&self) -> usize {
        self.items.iter().filter(|d| d.crossed).count()
    }
}
