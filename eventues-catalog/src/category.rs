use uuid::Uuid;

/// A ticket type inside a category (e.g. "Meia-entrada" under "Pista").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Owning category. Fixed for the subcategory's lifetime.
    pub category_id: Uuid,
}

impl Subcategory {
    pub fn new(category_id: Uuid, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            category_id,
        }
    }
}

/// Top level of the organizer's ticket taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            subcategories: Vec::new(),
        }
    }

    /// Append a subcategory owned by this category, returning its id
    pub fn add_subcategory(&mut self, name: impl Into<String>, description: Option<String>) -> Uuid {
        let subcategory = Subcategory::new(self.id, name, description);
        let id = subcategory.id;
        self.subcategories.push(subcategory);
        id
    }

    pub fn find_subcategory(&self, subcategory_id: &Uuid) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == *subcategory_id)
    }

    pub fn subcategory_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.subcategories.iter().map(|s| s.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcategory_back_reference() {
        let mut category = Category::new("Pista", None);
        let id = category.add_subcategory("Inteira", Some("Ingresso inteiro".to_string()));

        let subcategory = category.find_subcategory(&id).unwrap();
        assert_eq!(subcategory.category_id, category.id);
        assert_eq!(subcategory.name, "Inteira");
        assert_eq!(category.subcategory_ids().collect::<Vec<_>>(), vec![id]);
    }
}
