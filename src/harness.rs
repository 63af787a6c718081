//! Entry point tying collaborators, capability claims and verification
//! settings together.

use crate::case::TestCase;
use crate::config::Capabilities;
use crate::errors::TestResult;
use crate::factory::Collaborators;
use crate::outcome::Outcome;
use crate::verifier::{AliasPolicy, Tolerances, Verifier};
use log::debug;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Harness {
    collaborators: Arc<Collaborators>,
    capabilities: Capabilities,
    alias_policy: AliasPolicy,
    tolerances: Tolerances,
}

impl Harness {
    pub fn new(collaborators: Collaborators, capabilities: Capabilities) -> Self {
        Self {
            collaborators: Arc::new(collaborators),
            capabilities,
            alias_policy: AliasPolicy::default(),
            tolerances: Tolerances::default(),
        }
    }

    pub fn with_alias_policy(mut self, alias_policy: AliasPolicy) -> Self {
        self.alias_policy = alias_policy;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// A fresh top-level test case with its own configuration snapshot.
    pub fn test_case(&self, name: &str) -> TestResult<TestCase> {
        let verifier = Verifier::from_collaborators(&self.collaborators)
            .with_alias_policy(self.alias_policy)
            .with_tolerances(self.tolerances);
        Ok(TestCase::new(name, Arc::clone(&self.collaborators), &self.capabilities)?
            .with_verifier(verifier))
    }

    /// Runs one test method and classifies its result.
    pub fn run<F>(&self, name: &str, body: F) -> Outcome
    where
        F: FnOnce(&mut TestCase) -> TestResult<()>,
    {
        debug!("running {}", name);
        let result = self.test_case(name).and_then(|mut case| body(&mut case));
        Outcome::from_result(result)
    }
}
