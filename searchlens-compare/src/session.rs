//! Interactive search session.
//!
//! Holds the current query text, dataset and toggles, and re-dispatches
//! whenever one of them changes. Setting a value equal to the current one
//! sends nothing.

use crate::backend::SearchBackend;
use crate::board::ResultBoard;
use crate::dispatcher::{DispatchOutcome, Dispatcher, Toggles};
use crate::types::DatasetRef;

pub struct SearchSession<B> {
    dispatcher: Dispatcher<B>,
    dataset: DatasetRef,
    query: String,
    toggles: Toggles,
}

impl<B: SearchBackend + 'static> SearchSession<B> {
    pub fn new(dispatcher: Dispatcher<B>, dataset: DatasetRef) -> Self {
        Self {
            dispatcher,
            dataset,
            query: String::new(),
            toggles: Toggles::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    pub fn dataset(&self) -> &DatasetRef {
        &self.dataset
    }

    pub fn dispatcher(&self) -> &Dispatcher<B> {
        &self.dispatcher
    }

    pub fn board(&self) -> &ResultBoard {
        self.dispatcher.board()
    }

    /// Change the query text, re-dispatching if it differs.
    pub fn set_query(&mut self, query: &str) -> DispatchOutcome {
        let query = query.trim();
        if query == self.query {
            return DispatchOutcome::Unchanged;
        }
        self.query = query.to_owned();
        self.refresh()
    }

    /// Flip the blend toggle, re-dispatching if it differs.
    pub fn set_blend(&mut self, blend: bool) -> DispatchOutcome {
        if blend == self.toggles.blend {
            return DispatchOutcome::Unchanged;
        }
        self.toggles.blend = blend;
        self.refresh()
    }

    /// Switch dataset, re-dispatching if it differs.
    pub fn set_dataset(&mut self, dataset: DatasetRef) -> DispatchOutcome {
        if dataset == self.dataset {
            return DispatchOutcome::Unchanged;
        }
        self.dataset = dataset;
        self.refresh()
    }

    /// Dispatch the current state unconditionally.
    pub fn refresh(&self) -> DispatchOutcome {
        self.dispatcher.dispatch(&self.query, &self.dataset, self.toggles)
    }
}
