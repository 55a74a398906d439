//! Pending-change buffer of a unit of work
//!
//! Repositories record inserts and deletes here instead of writing them
//! immediately. The unit of work replays the intents, in the order they
//! were recorded, on the next flush or save.

use crate::entities::EntityRecord;

/// A change waiting to be written
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Add(EntityRecord),
    Remove(EntityRecord),
}

/// Ordered list of intents; nothing is deduplicated
#[derive(Debug, Default, Clone)]
pub struct Session {
    intents: Vec<Intent>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: EntityRecord) {
        self.intents.push(Intent::Add(entity));
    }

    pub fn remove(&mut self, entity: EntityRecord) {
        self.intents.push(Intent::Remove(entity));
    }

    /// Recorded intents, oldest first
    pub fn session(&self) -> &[Intent] {
        &self.intents
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Take every recorded intent, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TermsOfUseEntity;
    use chrono::Utc;
    use uuid::Uuid;

    fn record() -> EntityRecord {
        EntityRecord::TermsOfUse(TermsOfUseEntity {
            id: Uuid::new_v4(),
            created: Utc::now(),
        })
    }

    #[test]
    fn test_intents_keep_insertion_order() {
        let first = record();
        let second = record();

        let mut session = Session::new();
        session.add(first.clone());
        session.remove(second.clone());
        session.add(second.clone());

        assert_eq!(
            session.session(),
            &[
                Intent::Add(first),
                Intent::Remove(second.clone()),
                Intent::Add(second)
            ]
        );
    }

    #[test]
    fn test_same_entity_is_queued_twice() {
        let entity = record();
        let mut session = Session::new();
        session.add(entity.clone());
        session.add(entity);

        assert_eq!(session.session().len(), 2);
    }

    #[test]
    fn test_drain_empties_the_buffer() {
        let mut session = Session::new();
        session.add(record());

        assert_eq!(session.drain().len(), 1);
        assert!(session.is_empty());
    }
}
