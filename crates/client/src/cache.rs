//! In-memory entity cache.

use std::collections::HashMap;

use crate::types::{Application, Opportunity};

#[derive(Debug, Default)]
pub(crate) struct EntityCache {
    opportunities: HashMap<String, Opportunity>,
    applications: HashMap<String, Application>,
    lists: HashMap<String, Vec<Opportunity>>,
}

impl EntityCache {
    pub fn opportunity(&self, id: &str) -> Option<Opportunity> {
        self.opportunities.get(id).cloned()
    }

    pub fn application(&self, id: &str) -> Option<Application> {
        self.applications.get(id).cloned()
    }

    pub fn list(&self, key: &str) -> Option<Vec<Opportunity>> {
        self.lists.get(key).cloned()
    }

    pub fn store_opportunity(&mut self, opportunity: Opportunity) {
        self.opportunities.insert(opportunity.id.clone(), opportunity);
    }

    pub fn store_application(&mut self, application: Application) {
        self.applications.insert(application.id.clone(), application);
    }

    pub fn store_list(&mut self, key: String, items: Vec<Opportunity>) {
        self.lists.insert(key, items);
    }

    /// Drop the opportunity and every list, since any list may contain it.
    pub fn invalidate_opportunity(&mut self, id: &str) {
        self.opportunities.remove(id);
        self.lists.clear();
    }

    pub fn invalidate_application(&mut self, id: &str) {
        self.applications.remove(id);
        self.lists.clear();
    }

    pub fn clear(&mut self) {
        self.opportunities.clear();
        self.applications.clear();
        self.lists.clear();
    }
}
