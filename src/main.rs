//! kubectl-ssh-proxy CLI - proxy OpenSSH client tools through a Kubernetes pod

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use clap_complete::{Shell, generate};
use kubectl_ssh_proxy::commands::proxy::{self, ProxyOptions};
use kubectl_ssh_proxy::config::{ClusterOptions, Settings};
use kubectl_ssh_proxy::transport::TransportExit;
use kubectl_ssh_proxy::utils::errors::{FAILURE_EXIT_CODE, ProxyError};
use kubectl_ssh_proxy::utils::logger;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "kubectl-ssh-proxy")]
#[command(author, version, about = "Proxy OpenSSH client tools through Kubernetes pod", long_about = None)]
struct Cli {
    /// Path to the kubeconfig file to use
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// The name of the kubeconfig context to use
    #[arg(long)]
    context: Option<String>,

    /// The name of the kubeconfig cluster to use
    #[arg(long)]
    cluster: Option<String>,

    /// The name of the kubeconfig user to use
    #[arg(long)]
    user: Option<String>,

    /// Namespace to find or create the proxy pod in
    #[arg(short, long)]
    namespace: Option<String>,

    /// Seconds to wait for the proxy pod to be running
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Path to a settings file
    #[arg(long, env = "KUBECTL_SSH_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// ssh|scp|sftp followed by its own flags and arguments
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

const EXAMPLES: &str = "Examples:
  # ssh login to remote system
  {bin} ssh user@hostname

  # scp secure file copy
  {bin} scp localpath [user@]host:[path]

  # sftp secure file transfer
  {bin} sftp [user@]host[:path]";

/// Name shown in usage: installed as a kubectl plugin, the tool is invoked
/// as `kubectl ssh-proxy`
fn display_name(argv0: &str) -> String {
    let file_name = Path::new(argv0)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("kubectl-ssh-proxy");

    if file_name.starts_with("kubectl-") {
        "kubectl ssh-proxy".to_string()
    } else {
        file_name.to_string()
    }
}

fn command(bin: &str) -> clap::Command {
    Cli::command()
        .bin_name(bin.to_string())
        .override_usage(format!("{} [flags] ssh|scp|sftp [flags] [arguments]", bin))
        .after_help(EXAMPLES.replace("{bin}", bin))
}

fn parse_cli<I, T>(cmd: clap::Command, args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = cmd.try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

/// Help and version requests are not failures
fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    let bin = display_name(&std::env::args().next().unwrap_or_default());
    let mut cmd = command(&bin);
    let cli = match parse_cli(cmd.clone(), std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) if is_informational(&err) => err.exit(),
        Err(err) => {
            // Flag errors share the exit code of every other failure
            let _ = err.print();
            return ExitCode::from(FAILURE_EXIT_CODE);
        }
    };

    logger::init(cli.verbose);

    if let Some(shell) = cli.completions {
        generate(shell, &mut cmd, "kubectl-ssh-proxy", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(exit) => ExitCode::from(exit.exit_code()),
        Err(err) => {
            err.display();
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

async fn run(cli: Cli) -> Result<TransportExit, ProxyError> {
    let mut settings = Settings::load(cli.config.as_deref())
        .map_err(|e| ProxyError::Config(format!("{:#}", e)))?;
    if let Some(timeout) = cli.timeout {
        settings.wait.timeout_secs = timeout;
    }
    settings
        .validate()
        .map_err(|e| ProxyError::Config(format!("{:#}", e)))?;

    let options = ProxyOptions {
        cluster: ClusterOptions {
            kubeconfig: cli.kubeconfig,
            context: cli.context,
            cluster: cli.cluster,
            user: cli.user,
            namespace: cli.namespace,
        },
        settings,
        args: cli.args,
    };

    proxy::run(&options).await
}
