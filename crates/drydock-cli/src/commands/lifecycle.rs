//! Worker lifecycle commands: `whoami`, `startup`, `after-run`.

use drydock_app::{Admission, WorkerContext};

use crate::cli::OutputFormat;
use crate::error::{CliResult, Status};
use crate::output::{render_identity, render_maintenance, render_service_id};

pub(crate) async fn handle_whoami(ctx: &WorkerContext, format: OutputFormat) -> CliResult<Status> {
    let service = ctx.resolve_identity().await?;
    println!("{}", render_service_id(&service, format, &ctx.metrics().snapshot())?);
    Ok(Status::Ok)
}

pub(crate) async fn handle_startup(ctx: &WorkerContext, format: OutputFormat) -> CliResult<Status> {
    let report = ctx.startup().await?;
    println!("{}", render_identity(&report.identity, format, &ctx.metrics().snapshot())?);
    Ok(Status::Ok)
}

pub(crate) async fn handle_after_run(
    ctx: &WorkerContext,
    format: OutputFormat,
) -> CliResult<Status> {
    let report = ctx.after_run().await?;
    println!("{}", render_maintenance(&report, format, &ctx.metrics().snapshot())?);
    Ok(match report.admission {
        Admission::Accept => Status::Ok,
        Admission::Pause { .. } => Status::Paused,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_config::WorkerConfig;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

    fn context(root: &TempDir, vars: &[(&str, String)]) -> TestResult<WorkerContext> {
        let tmp = root.path().join("tmp");
        fs::create_dir_all(&tmp)?;
        let mut env: HashMap<String, String> = HashMap::from([
            ("DRYDOCK_TEMP_ROOT".to_string(), tmp.display().to_string()),
            (
                "DRYDOCK_USAGE_ROOT".to_string(),
                root.path().display().to_string(),
            ),
            (
                "DRYDOCK_AWS_PROGRAM".to_string(),
                "/nonexistent/drydock-aws".to_string(),
            ),
        ]);
        for (key, value) in vars {
            env.insert((*key).to_string(), value.clone());
        }
        let config = WorkerConfig::from_lookup(|name| env.get(name).cloned())?;
        Ok(WorkerContext::from_config(config)?)
    }

    fn temp_dir() -> TestResult<TempDir> {
        Ok(tempfile::Builder::new().prefix("drydock-cli-").tempdir()?)
    }

    fn agent_listing(server: &MockServer, container: &str) {
        server.mock(|when, then| {
            when.method(GET).path("/v1/tasks");
            then.status(200).json_body(json!({
                "Tasks": [{
                    "Arn": "arn:aws:ecs:us-east-1:123:task/abc",
                    "Containers": [{"Name": container}]
                }]
            }));
        });
    }

    fn identity_vars(server: &MockServer) -> Vec<(&'static str, String)> {
        vec![
            ("DRYDOCK_AGENT_URL", server.url("/v1/tasks")),
            ("DRYDOCK_CONTAINER_NAME", "watcher".to_string()),
            ("DRYDOCK_CLUSTER_NAME", "my-cluster".to_string()),
        ]
    }

    #[tokio::test]
    async fn whoami_exits_five_when_container_is_unknown() -> TestResult<()> {
        let server = MockServer::start_async().await;
        agent_listing(&server, "sidecar");
        let root = temp_dir()?;
        let ctx = context(&root, &identity_vars(&server))?;

        let err = handle_whoami(&ctx, OutputFormat::Text).await.err();
        assert_eq!(err.map(|err| err.exit_code()), Some(5));
        Ok(())
    }

    #[tokio::test]
    async fn whoami_exits_three_when_control_plane_fails() -> TestResult<()> {
        let server = MockServer::start_async().await;
        agent_listing(&server, "watcher");
        let root = temp_dir()?;
        let ctx = context(&root, &identity_vars(&server))?;

        let err = handle_whoami(&ctx, OutputFormat::Text).await.err();
        assert_eq!(err.map(|err| err.exit_code()), Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn whoami_without_names_is_a_validation_error() -> TestResult<()> {
        let root = temp_dir()?;
        let ctx = context(&root, &[])?;

        let err = handle_whoami(&ctx, OutputFormat::Json).await.err();
        assert_eq!(err.map(|err| err.exit_code()), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn startup_succeeds_with_unreachable_agent() -> TestResult<()> {
        let root = temp_dir()?;
        let work = root.path().join("work");
        fs::create_dir_all(&work)?;
        let vars = [
            ("DRYDOCK_VOLUMES", work.display().to_string()),
            ("DRYDOCK_AGENT_URL", "http://127.0.0.1:9/v1/tasks".to_string()),
            ("DRYDOCK_AGENT_TIMEOUT_SECS", "1".to_string()),
            ("DRYDOCK_CONTAINER_NAME", "watcher".to_string()),
            ("DRYDOCK_CLUSTER_NAME", "my-cluster".to_string()),
        ];
        let ctx = context(&root, &vars)?;

        let status = handle_startup(&ctx, OutputFormat::Json)
            .await
            .map_err(|err| err.display_message())?;
        assert_eq!(status, Status::Ok);
        Ok(())
    }

    #[tokio::test]
    async fn after_run_pauses_when_measurement_fails() -> TestResult<()> {
        let root = temp_dir()?;
        let ctx = context(&root, &[("DRYDOCK_DU_PROGRAM", "echo".to_string())])?;

        let status = handle_after_run(&ctx, OutputFormat::Json)
            .await
            .map_err(|err| err.display_message())?;
        assert_eq!(status.exit_code(), 4);
        Ok(())
    }
}
