//! Worker invoked by `pg-embed-setup-unpriv` when integration tests run as
//! root. It performs one cluster operation as the unprivileged user.
//!
//! ```text
//! pg_worker <setup|start|stop> <payload.json>
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::PathBuf;

use color_eyre::eyre::{Context, Report, Result, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    run(env::args_os())
}

fn run(mut args: impl Iterator<Item = OsString>) -> Result<()> {
    let _program = args.next();
    let operation = Operation::parse(&args.next().ok_or_else(|| eyre!("missing operation"))?)?;
    let payload_path = PathBuf::from(args.next().ok_or_else(|| eyre!("missing payload path"))?);
    if let Some(extra) = args.next() {
        return Err(eyre!("unexpected argument: {}", extra.to_string_lossy()));
    }

    let raw = fs::read(&payload_path)
        .with_context(|| format!("failed to read worker payload at {payload_path:?}"))?;
    let payload: WorkerPayload = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse worker payload at {payload_path:?}"))?;
    execute(operation, payload)
}

fn execute(operation: Operation, payload: WorkerPayload) -> Result<()> {
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("failed to rebuild postgres settings"))?;
    for (key, value) in payload.environment {
        // SAFETY: no other threads exist yet.
        match value {
            Some(value) => unsafe { env::set_var(&key, value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build worker runtime")?;
    let mut postgres = PostgreSQL::new(settings);
    runtime
        .block_on(async move {
            match operation {
                Operation::Setup => postgres.setup().await,
                Operation::Start => postgres.start().await,
                Operation::Stop => postgres.stop().await,
            }
        })
        .with_context(|| format!("postgres {operation} failed"))
}

#[derive(Clone, Copy, Debug)]
enum Operation {
    Setup,
    Start,
    Stop,
}

impl Operation {
    fn parse(raw: &OsStr) -> Result<Self> {
        match raw.to_string_lossy().as_ref() {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!("unknown pg_worker operation '{other}'")),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_operations_are_rejected() {
        let err = Operation::parse(OsStr::new("restart")).expect_err("invalid op");
        assert!(err.to_string().contains("unknown pg_worker operation"));
    }

    #[test]
    fn extra_arguments_are_rejected() {
        let args = ["pg_worker", "setup", "/tmp/payload.json", "surplus"].map(OsString::from);
        let err = run(args.into_iter()).expect_err("extra argument");
        assert!(err.to_string().contains("unexpected argument"));
    }
}
