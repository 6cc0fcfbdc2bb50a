use std::future::Future;

use crate::{error::Result, reporter::Reporter};

/// What the user sees while a step runs and once it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub loading: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
}

pub const CLONE: StepDescriptor = StepDescriptor {
    loading: "Cloning blueprint repo...",
    success: "Blueprint cloned!",
    failure: "Unable to clone blueprint!",
};

pub const SET_APP_NAME: StepDescriptor = StepDescriptor {
    loading: "Setting app name...",
    success: "App name set!",
    failure: "Unable to set app name!",
};

pub const INSTALL: StepDescriptor = StepDescriptor {
    loading: "Installing dependencies, this could take awhile...",
    success: "Installed dependencies!",
    failure: "Unable to install dependencies!",
};

pub const GIT_INIT: StepDescriptor = StepDescriptor {
    loading: "Initializing git repository...",
    success: "Initialized git repository!",
    failure: "Unable to initialize git repository!",
};

/// Runs `action` between a loading event and either a success or a failure
/// event. Errors are returned untouched after being reported.
///
/// # Errors
///
/// Returns whatever `action` fails with.
pub async fn run_step<F, Fut, T>(
    reporter: &dyn Reporter,
    descriptor: &StepDescriptor,
    action: F,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    reporter.start(descriptor.loading);

    match action().await {
        Ok(value) => {
            reporter.succeed(descriptor.success);
            Ok(value)
        }
        Err(err) => {
            reporter.fail(&failure_message(descriptor, &err.to_string()));
            Err(err)
        }
    }
}

fn failure_message(descriptor: &StepDescriptor, cause: &str) -> String {
    if cause.is_empty() {
        descriptor.failure.to_string()
    } else {
        format!("{} ({cause})", descriptor.failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::BlueprintError,
        reporter::{Event, RecordingReporter},
    };

    #[tokio::test]
    async fn success_is_reported_once() {
        let reporter = RecordingReporter::new();

        let value = run_step(&reporter, &CLONE, || async { Ok(7) }).await.unwrap();

        assert_eq!(value, 7);
        assert_eq!(
            reporter.events(),
            vec![
                Event::Start("Cloning blueprint repo...".into()),
                Event::Succeed("Blueprint cloned!".into()),
            ]
        );
    }

    #[tokio::test]
    async fn failure_is_reported_and_returned() {
        let reporter = RecordingReporter::new();

        let err = run_step(&reporter, &GIT_INIT, || async {
            Err::<(), _>(BlueprintError::VcsInit {
                detail: "no git".into(),
            })
        })
        .await
        .unwrap_err();

        assert!(matches!(err, BlueprintError::VcsInit { .. }));
        assert_eq!(
            reporter.events(),
            vec![
                Event::Start("Initializing git repository...".into()),
                Event::Fail("Unable to initialize git repository! (`git init` failed: no git)".into()),
            ]
        );
    }

    #[tokio::test]
    async fn empty_cause_is_left_out() {
        let reporter = RecordingReporter::new();

        let _ = run_step(&reporter, &SET_APP_NAME, || async {
            Err::<(), _>(BlueprintError::transfer(""))
        })
        .await;

        assert_eq!(
            reporter.events().last(),
            Some(&Event::Fail("Unable to set app name!".into()))
        );
    }
}
