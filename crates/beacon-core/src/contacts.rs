use crate::error::{Error, Result};
use crate::ids::IdGenerator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub relationship: String,
}

/// Input for [`ContactStore::add`]. Only `name` and `phone` are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub relationship: String,
}

/// Emergency contacts in insertion order.
#[derive(Debug, Clone)]
pub struct ContactStore {
    contacts: Vec<Contact>,
    ids: IdGenerator,
}

impl ContactStore {
    pub fn new() -> Self {
        Self {
            contacts: Vec::new(),
            ids: IdGenerator::new("contact"),
        }
    }

    pub fn with_contacts(contacts: Vec<Contact>) -> Self {
        Self {
            contacts,
            ..Self::new()
        }
    }

    pub fn add(&mut self, new: NewContact) -> Result<Contact> {
        let name = new.name.trim();
        let phone = new.phone.trim();
        if name.is_empty() || phone.is_empty() {
            return Err(Error::invalid("name and phone number are required"));
        }

        let contacts = &self.contacts;
        let id = self
            .ids
            .next_unused(|candidate| contacts.iter().any(|c| c.id == candidate));
        let contact = Contact {
            id,
            name: name.to_string(),
            phone: phone.to_string(),
            email: new.email.trim().to_string(),
            relationship: new.relationship.trim().to_string(),
        };
        self.contacts.push(contact.clone());
        tracing::info!("Contact {} added ({})", contact.id, contact.name);
        Ok(contact)
    }

    pub fn delete(&mut self, id: &str) -> Result<Contact> {
        let idx = self
            .contacts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::not_found("contact", id))?;
        let removed = self.contacts.remove(idx);
        tracing::info!("Contact {} removed", removed.id);
        Ok(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub fn list(&self) -> Vec<Contact> {
        self.contacts.clone()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl Default for ContactStore {
    fn default() -> Self {
        Self::new()
    }
}

pub fn default_contacts() -> Vec<Contact> {
    let contact = |id: &str, name: &str, phone: &str, email: &str, relationship: &str| Contact {
        id: id.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        relationship: relationship.to_string(),
    };
    vec![
        contact("1", "John Doe", "(555) 123-4567", "john.doe@example.com", "Family"),
        contact("2", "Jane Smith", "(555) 987-6543", "jane.smith@example.com", "Friend"),
        contact("3", "Dr. Robert Johnson", "(555) 456-7890", "dr.johnson@example.com", "Doctor"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_contact(name: &str, phone: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            phone: phone.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_appends() -> anyhow::Result<()> {
        let mut store = ContactStore::with_contacts(default_contacts());
        let added = store.add(new_contact("  Ana Lima ", "(555) 000-1111"))?;
        assert_eq!(added.name, "Ana Lima");
        assert_eq!(store.len(), 4);
        assert_eq!(store.list().last().map(|c| c.id.clone()), Some(added.id));
        Ok(())
    }

    #[test]
    fn test_add_requires_name_and_phone() {
        let mut store = ContactStore::new();
        assert!(matches!(
            store.add(new_contact("", "(555) 000-1111")),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.add(new_contact("Ana", "  ")),
            Err(Error::InvalidInput(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete() -> anyhow::Result<()> {
        let mut store = ContactStore::with_contacts(default_contacts());
        let removed = store.delete("2")?;
        assert_eq!(removed.name, "Jane Smith");
        assert!(store.get("2").is_none());
        assert!(matches!(store.delete("2"), Err(Error::NotFound(_))));
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[test]
    fn test_new_contact_optional_fields_deserialize() {
        let parsed: NewContact =
            serde_json::from_str(r#"{"name":"Ana","phone":"555"}"#).unwrap();
        assert_eq!(parsed.email, "");
        assert_eq!(parsed.relationship, "");
    }
}
