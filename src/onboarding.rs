use crate::config::BuildMode;
use crate::model::OnboardingState;
use crate::persist::{ErrorCallback, Persister};
use crate::storage::{self, KeyValueStorage};
use log::{debug, info, warn};
use std::sync::Arc;

pub const ONBOARDING_STORE_KEY: &str = "onboarding-storage";

/// First-run flag. In development mode reads always report "not completed"
/// and nothing is written, so the intro flow can be iterated on.
pub struct OnboardingStore {
    state: OnboardingState,
    mode: BuildMode,
    persister: Persister,
}

impl OnboardingStore {
    pub fn open(storage: Arc<dyn KeyValueStorage>, mode: BuildMode) -> Self {
        Self::open_with_error_callback(storage, mode, None)
    }

    pub fn open_with_error_callback(
        storage: Arc<dyn KeyValueStorage>,
        mode: BuildMode,
        on_error: Option<ErrorCallback>,
    ) -> Self {
        let state = match mode {
            BuildMode::Development => OnboardingState::default(),
            BuildMode::Production => load(storage.as_ref()),
        };
        OnboardingStore {
            state,
            mode,
            persister: Persister::spawn(storage, on_error),
        }
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.state.has_completed_onboarding
    }

    pub fn complete_onboarding(&mut self) {
        self.set(true);
    }

    pub fn reset_onboarding(&mut self) {
        self.set(false);
    }

    pub fn flush(&self) {
        self.persister.flush();
    }

    fn set(&mut self, completed: bool) {
        self.state.has_completed_onboarding = completed;
        match self.mode {
            BuildMode::Development => {
                debug!("event=onboarding_set module=onboarding status=skipped mode=dev completed={completed}");
            }
            BuildMode::Production => {
                info!("event=onboarding_set module=onboarding status=ok completed={completed}");
                self.persister.save(ONBOARDING_STORE_KEY, &self.state);
            }
        }
    }
}

fn load(storage: &dyn KeyValueStorage) -> OnboardingState {
    match storage.get_item(ONBOARDING_STORE_KEY) {
        Ok(Some(raw)) => storage::from_json(ONBOARDING_STORE_KEY, &raw).unwrap_or_else(|err| {
            warn!("event=hydrate module=onboarding status=error err={err}");
            OnboardingState::default()
        }),
        Ok(None) => OnboardingState::default(),
        Err(err) => {
            warn!("event=hydrate module=onboarding status=error err={err}");
            OnboardingState::default()
        }
    }
}
