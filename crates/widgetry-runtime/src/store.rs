//! In-memory [`WidgetStore`].

use parking_lot::RwLock;
use tracing::trace;
use widgetry_core::{
    Area, InstalledWidget, InstanceRecord, InstanceUpdate, NewArea, NewInstance, NewWidget,
    RecordKey, StoreError, StoreResult, WidgetStore,
};

#[derive(Debug, Clone)]
struct StoredInstance {
    id: u64,
    title: String,
    widget_id: u64,
    widget_area_id: u64,
    options: String,
    order: u32,
}

#[derive(Debug, Default)]
struct Tables {
    areas: Vec<Area>,
    widgets: Vec<InstalledWidget>,
    instances: Vec<StoredInstance>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Joins the widget slug onto a stored instance.
    fn record(&self, instance: &StoredInstance) -> InstanceRecord {
        let slug = self
            .widgets
            .iter()
            .find(|w| w.id == instance.widget_id)
            .map(|w| w.slug.clone())
            .unwrap_or_default();

        InstanceRecord {
            id: instance.id,
            title: instance.title.clone(),
            widget_id: instance.widget_id,
            widget_area_id: instance.widget_area_id,
            slug,
            options: instance.options.clone(),
            order: instance.order,
        }
    }

    fn area_by(&self, key: &RecordKey) -> Option<&Area> {
        self.areas.iter().find(|a| match key {
            RecordKey::Id(id) => a.id == *id,
            RecordKey::Slug(slug) => a.slug == *slug,
        })
    }

    fn widget_by(&self, key: &RecordKey) -> Option<&InstalledWidget> {
        self.widgets.iter().find(|w| match key {
            RecordKey::Id(id) => w.id == *id,
            RecordKey::Slug(slug) => w.slug == *slug,
        })
    }
}

/// Process-local store guarded by a read-write lock.
///
/// Ids are shared across all tables and never reused. New instances are
/// appended after the last instance of their area. Deleting a widget or an
/// area deletes its instances.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WidgetStore for MemoryStore {
    fn get_areas(&self) -> StoreResult<Vec<Area>> {
        Ok(self.tables.read().areas.clone())
    }

    fn get_instances_by_area(&self, area_slug: &str) -> StoreResult<Vec<InstanceRecord>> {
        let tables = self.tables.read();
        let Some(area) = tables.area_by(&RecordKey::Slug(area_slug.to_string())) else {
            return Ok(Vec::new());
        };

        let mut records: Vec<InstanceRecord> = tables
            .instances
            .iter()
            .filter(|i| i.widget_area_id == area.id)
            .map(|i| tables.record(i))
            .collect();
        records.sort_by_key(|r| (r.order, r.id));
        Ok(records)
    }

    fn get_widgets(&self) -> StoreResult<Vec<InstalledWidget>> {
        Ok(self.tables.read().widgets.clone())
    }

    fn get_instance(&self, id: u64) -> StoreResult<Option<InstanceRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .instances
            .iter()
            .find(|i| i.id == id)
            .map(|i| tables.record(i)))
    }

    fn get_area_by(&self, key: &RecordKey) -> StoreResult<Option<Area>> {
        Ok(self.tables.read().area_by(key).cloned())
    }

    fn get_widget_by(&self, key: &RecordKey) -> StoreResult<Option<InstalledWidget>> {
        Ok(self.tables.read().widget_by(key).cloned())
    }

    fn insert_widget(&self, widget: NewWidget) -> StoreResult<u64> {
        let mut tables = self.tables.write();
        if tables.widget_by(&RecordKey::Slug(widget.slug.clone())).is_some() {
            return Err(StoreError::backend(format!(
                "widget slug '{}' already exists",
                widget.slug
            )));
        }

        let id = tables.next_id();
        tables.widgets.push(InstalledWidget {
            id,
            slug: widget.slug,
            title: widget.title,
            description: widget.description,
            author: widget.author,
            website: widget.website,
            version: widget.version,
        });
        trace!(id, "Widget row inserted");
        Ok(id)
    }

    fn delete_widget(&self, slug: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let Some(id) = tables
            .widget_by(&RecordKey::Slug(slug.to_string()))
            .map(|w| w.id)
        else {
            return Ok(false);
        };

        tables.widgets.retain(|w| w.id != id);
        tables.instances.retain(|i| i.widget_id != id);
        Ok(true)
    }

    fn insert_area(&self, area: NewArea) -> StoreResult<u64> {
        let mut tables = self.tables.write();
        if tables.area_by(&RecordKey::Slug(area.slug.clone())).is_some() {
            return Err(StoreError::backend(format!(
                "area slug '{}' already exists",
                area.slug
            )));
        }

        let id = tables.next_id();
        tables.areas.push(Area {
            id,
            title: area.title,
            slug: area.slug,
        });
        trace!(id, "Area row inserted");
        Ok(id)
    }

    fn delete_area(&self, id: u64) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.areas.len();
        tables.areas.retain(|a| a.id != id);
        if tables.areas.len() == before {
            return Ok(false);
        }
        tables.instances.retain(|i| i.widget_area_id != id);
        Ok(true)
    }

    fn insert_instance(&self, instance: NewInstance) -> StoreResult<u64> {
        let mut tables = self.tables.write();
        if tables.widget_by(&RecordKey::Id(instance.widget_id)).is_none() {
            return Err(StoreError::not_found("widget", instance.widget_id));
        }
        if tables.area_by(&RecordKey::Id(instance.widget_area_id)).is_none() {
            return Err(StoreError::not_found("area", instance.widget_area_id));
        }

        let order = tables
            .instances
            .iter()
            .filter(|i| i.widget_area_id == instance.widget_area_id)
            .map(|i| i.order + 1)
            .max()
            .unwrap_or(0);

        let id = tables.next_id();
        tables.instances.push(StoredInstance {
            id,
            title: instance.title,
            widget_id: instance.widget_id,
            widget_area_id: instance.widget_area_id,
            options: instance.options,
            order,
        });
        trace!(id, order, "Instance row inserted");
        Ok(id)
    }

    fn update_instance(&self, id: u64, update: InstanceUpdate) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        if tables.area_by(&RecordKey::Id(update.widget_area_id)).is_none() {
            return Err(StoreError::not_found("area", update.widget_area_id));
        }
        let Some(instance) = tables.instances.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };

        instance.title = update.title;
        instance.widget_area_id = update.widget_area_id;
        instance.options = update.options;
        Ok(true)
    }

    fn update_instance_order(&self, id: u64, position: u32) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let Some(instance) = tables.instances.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        instance.order = position;
        Ok(true)
    }

    fn delete_instance(&self, id: u64) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.instances.len();
        tables.instances.retain(|i| i.id != id);
        Ok(tables.instances.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(slug: &str) -> NewWidget {
        NewWidget {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            ..NewWidget::default()
        }
    }

    fn area(slug: &str) -> NewArea {
        NewArea {
            title: slug.to_uppercase(),
            slug: slug.to_string(),
        }
    }

    fn instance(widget_id: u64, area_id: u64, title: &str) -> NewInstance {
        NewInstance {
            title: title.to_string(),
            widget_id,
            widget_area_id: area_id,
            options: "{}".to_string(),
        }
    }

    #[test]
    fn test_instances_appended_and_joined() {
        let store = MemoryStore::new();
        let tags = store.insert_widget(widget("tags")).unwrap();
        let sidebar = store.insert_area(area("sidebar")).unwrap();
        let footer = store.insert_area(area("footer")).unwrap();

        let a = store.insert_instance(instance(tags, sidebar, "A")).unwrap();
        let b = store.insert_instance(instance(tags, sidebar, "B")).unwrap();
        store.insert_instance(instance(tags, footer, "C")).unwrap();

        let records = store.get_instances_by_area("sidebar").unwrap();
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), [a, b]);
        assert_eq!(records[1].order, 1);
        assert!(records.iter().all(|r| r.slug == "tags"));
        assert!(store.get_instances_by_area("header").unwrap().is_empty());
    }

    #[test]
    fn test_reorder() {
        let store = MemoryStore::new();
        let tags = store.insert_widget(widget("tags")).unwrap();
        let sidebar = store.insert_area(area("sidebar")).unwrap();
        let a = store.insert_instance(instance(tags, sidebar, "A")).unwrap();
        let b = store.insert_instance(instance(tags, sidebar, "B")).unwrap();

        assert!(store.update_instance_order(a, 3).unwrap());
        assert!(!store.update_instance_order(999, 0).unwrap());

        let ids: Vec<u64> = store
            .get_instances_by_area("sidebar")
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, [b, a]);
    }

    #[test]
    fn test_lookups_by_key() {
        let store = MemoryStore::new();
        let id = store.insert_area(area("sidebar")).unwrap();

        assert_eq!(store.get_area_by(&RecordKey::Id(id)).unwrap().unwrap().slug, "sidebar");
        assert_eq!(
            store.get_area_by(&RecordKey::parse("sidebar")).unwrap().unwrap().id,
            id
        );
        assert!(store.get_widget_by(&RecordKey::parse("tags")).unwrap().is_none());
    }

    #[test]
    fn test_cascading_deletes() {
        let store = MemoryStore::new();
        let tags = store.insert_widget(widget("tags")).unwrap();
        let html = store.insert_widget(widget("html")).unwrap();
        let sidebar = store.insert_area(area("sidebar")).unwrap();
        let footer = store.insert_area(area("footer")).unwrap();
        let keep = store.insert_instance(instance(html, sidebar, "Keep")).unwrap();
        store.insert_instance(instance(tags, sidebar, "Tags")).unwrap();
        store.insert_instance(instance(html, footer, "Footer")).unwrap();

        assert!(store.delete_widget("tags").unwrap());
        assert!(!store.delete_widget("tags").unwrap());
        assert!(store.delete_area(footer).unwrap());

        let left = store.get_instances_by_area("sidebar").unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, keep);
        assert!(store.delete_instance(keep).unwrap());
        assert!(store.get_instance(keep).unwrap().is_none());
    }

    #[test]
    fn test_integrity_errors() {
        let store = MemoryStore::new();
        store.insert_widget(widget("tags")).unwrap();

        assert!(matches!(
            store.insert_widget(widget("tags")),
            Err(StoreError::Backend(_))
        ));
        assert!(matches!(
            store.insert_instance(instance(42, 1, "x")),
            Err(StoreError::NotFound { kind: "widget", .. })
        ));
    }
}
