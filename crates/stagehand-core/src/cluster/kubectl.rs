//! Cluster handle backed by the `kubectl`, `kind`, `helm` and `docker`
//! command-line tools.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use tokio::process::Command;

use super::{ClusterHandle, ClusterResource, ReadinessQuery};
use crate::{config::DeploymentConfig, error::ClusterError, models::StepAction};

/// Drives a local `kind` cluster through child processes.
#[derive(Debug, Clone)]
pub struct KubectlCluster {
    cluster_name: String,
    kube_context: Option<String>,
    cache_dir: PathBuf,
}

/// Captured result of one tool invocation.
#[derive(Debug)]
struct ToolOutput {
    command: String,
    status: i32,
    stdout: String,
    stderr: String,
}

impl ToolOutput {
    fn success(&self) -> bool {
        self.status == 0
    }

    /// Turns a non-zero exit into an error.
    fn checked(self) -> Result<Self, ClusterError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ClusterError::Command {
                command: self.command,
                status: self.status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

async fn exec(program: &str, args: Vec<String>) -> Result<ToolOutput, ClusterError> {
    let command = format!("{program} {}", args.join(" "));
    debug!("Running: {command}");

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ClusterError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    Ok(ToolOutput {
        command,
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

fn owned<'a>(args: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    args.into_iter().map(str::to_string).collect()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl KubectlCluster {
    pub fn new(config: &DeploymentConfig) -> Self {
        Self {
            cluster_name: config.cluster_name.clone(),
            kube_context: config.kube_context.clone(),
            cache_dir: config.cache_dir.clone(),
        }
    }

    async fn kubectl<'a>(
        &self,
        args: impl IntoIterator<Item = &'a str>,
    ) -> Result<ToolOutput, ClusterError> {
        let mut full = Vec::new();
        if let Some(context) = &self.kube_context {
            full.extend(["--context".to_string(), context.clone()]);
        }
        full.extend(owned(args));
        exec("kubectl", full).await
    }

    async fn helm(&self, mut args: Vec<String>) -> Result<ToolOutput, ClusterError> {
        if let Some(context) = &self.kube_context {
            args.extend(["--kube-context".to_string(), context.clone()]);
        }
        exec("helm", args).await
    }

    async fn kind(&self, args: Vec<String>) -> Result<ToolOutput, ClusterError> {
        exec("kind", args).await
    }

    async fn docker<'a>(
        &self,
        args: impl IntoIterator<Item = &'a str>,
    ) -> Result<ToolOutput, ClusterError> {
        exec("docker", owned(args)).await
    }

    /// Where `docker build` records the id of the image built for `tag`.
    ///
    /// Bytes other than ASCII alphanumerics, `.` and `-` are written as `_`
    /// followed by two hex digits, so distinct tags never share a file.
    fn image_id_file(&self, tag: &str) -> PathBuf {
        let mut name = String::with_capacity(tag.len());
        for byte in tag.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'.' || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{byte:02x}"));
            }
        }
        self.cache_dir.join(format!("{name}.iid"))
    }

    async fn cluster_listed(&self, name: &str) -> Result<bool, ClusterError> {
        let out = self.kind(owned(["get", "clusters"])).await?.checked()?;
        Ok(out.stdout.lines().any(|line| line.trim() == name))
    }

    async fn build_image(
        &self,
        context: &Path,
        tag: &str,
        dockerfile: Option<&Path>,
    ) -> Result<(), ClusterError> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| ClusterError::FileSystem {
                path: self.cache_dir.clone(),
                source: e,
            })?;

        let iid = path_arg(&self.image_id_file(tag));
        let mut args = vec!["build", "-t", tag, "--iidfile", iid.as_str()];
        let dockerfile = dockerfile.map(path_arg);
        if let Some(file) = &dockerfile {
            args.extend(["-f", file.as_str()]);
        }
        let context = path_arg(context);
        args.push(context.as_str());
        self.docker(args).await?.checked()?;

        self.kind(owned([
            "load",
            "docker-image",
            tag,
            "--name",
            self.cluster_name.as_str(),
        ]))
        .await?
            .checked()?;
        Ok(())
    }
}

/// Decides readiness from a `kubectl get -o json` list.
///
/// At least one item must match, and every match must report the condition
/// with status `True`.
fn conditions_hold(list: &Value, condition: &str) -> Result<bool, String> {
    let items = list
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing 'items' array".to_string())?;

    if items.is_empty() {
        return Ok(false);
    }

    Ok(items.iter().all(|item| {
        item.pointer("/status/conditions")
            .and_then(Value::as_array)
            .is_some_and(|conditions| {
                conditions.iter().any(|c| {
                    c.get("type").and_then(Value::as_str) == Some(condition)
                        && c.get("status").and_then(Value::as_str) == Some("True")
                })
            })
    }))
}

/// Extracts the release status from `helm status -o json`.
fn release_deployed(status: &Value) -> bool {
    status.pointer("/info/status").and_then(Value::as_str) == Some("deployed")
}

#[async_trait]
impl ClusterHandle for KubectlCluster {
    async fn apply(&self, action: &StepAction, namespace: &str) -> Result<(), ClusterError> {
        match action {
            StepAction::ApplyManifest { path, .. } => {
                let path = path_arg(path);
                self.kubectl(["apply", "-n", namespace, "-f", path.as_str()])
                    .await?
                    .checked()?;
            }
            StepAction::BuildImage {
                context,
                tag,
                dockerfile,
            } => {
                self.build_image(context, tag, dockerfile.as_deref()).await?;
            }
            StepAction::InstallChart {
                release,
                chart,
                version,
                repo,
                set,
                ..
            } => {
                if let Some(repo) = repo {
                    self.helm(owned([
                        "repo",
                        "add",
                        repo.name.as_str(),
                        repo.url.as_str(),
                        "--force-update",
                    ]))
                        .await?
                        .checked()?;
                }
                let mut args = owned([
                    "upgrade",
                    "--install",
                    release.as_str(),
                    chart.as_str(),
                    "--namespace",
                    namespace,
                    "--create-namespace",
                ]);
                if let Some(version) = version {
                    args.extend(["--version".to_string(), version.clone()]);
                }
                for pair in set {
                    args.extend(["--set".to_string(), pair.clone()]);
                }
                self.helm(args).await?.checked()?;
            }
            StepAction::CreateCluster { config } => {
                let mut args = owned(["create", "cluster", "--name", self.cluster_name.as_str()]);
                if let Some(config) = config {
                    args.extend(["--config".to_string(), path_arg(config)]);
                }
                self.kind(args).await?.checked()?;
            }
        }
        Ok(())
    }

    async fn is_satisfied(
        &self,
        action: &StepAction,
        namespace: &str,
    ) -> Result<bool, ClusterError> {
        match action {
            StepAction::ApplyManifest { path, .. } => {
                let path = path_arg(path);
                let out = self
                    .kubectl(["diff", "-n", namespace, "-f", path.as_str()])
                    .await?;
                // kubectl diff: 0 = no differences, 1 = differences
                match out.status {
                    0 => Ok(true),
                    1 => Ok(false),
                    _ => out.checked().map(|_| false),
                }
            }
            StepAction::BuildImage { tag, .. } => {
                if !self.image_id_file(tag).exists() {
                    return Ok(false);
                }
                Ok(self.docker(["image", "inspect", tag]).await?.success())
            }
            StepAction::InstallChart { release, .. } => {
                let out = self
                    .helm(owned([
                        "status",
                        release.as_str(),
                        "--namespace",
                        namespace,
                        "-o",
                        "json",
                    ]))
                    .await?;
                if !out.success() {
                    return Ok(false);
                }
                let status: Value =
                    serde_json::from_str(&out.stdout).map_err(|e| ClusterError::Output {
                        command: out.command.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(release_deployed(&status))
            }
            StepAction::CreateCluster { .. } => self.cluster_listed(&self.cluster_name).await,
        }
    }

    async fn is_ready(&self, query: &ReadinessQuery) -> Result<bool, ClusterError> {
        let out = self
            .kubectl([
                "get",
                query.kind.as_str(),
                "-n",
                query.namespace.as_str(),
                "-l",
                query.selector.as_str(),
                "-o",
                "json",
            ])
            .await?
            .checked()?;

        let list: Value = serde_json::from_str(&out.stdout).map_err(|e| ClusterError::Output {
            command: out.command.clone(),
            reason: e.to_string(),
        })?;
        conditions_hold(&list, &query.condition).map_err(|reason| ClusterError::Output {
            command: out.command,
            reason,
        })
    }

    async fn exists(&self, resource: &ClusterResource) -> Result<bool, ClusterError> {
        match resource {
            ClusterResource::Namespace(name) => {
                let out = self.kubectl(["get", "namespace", name.as_str(), "-o", "name"]).await?;
                if out.success() {
                    Ok(true)
                } else if out.stderr.contains("NotFound") || out.stderr.contains("not found") {
                    Ok(false)
                } else {
                    out.checked().map(|_| false)
                }
            }
            ClusterResource::Cluster(name) => self.cluster_listed(name).await,
            ClusterResource::BuildCache(dir) => {
                tokio::fs::try_exists(dir)
                    .await
                    .map_err(|e| ClusterError::FileSystem {
                        path: dir.clone(),
                        source: e,
                    })
            }
        }
    }

    async fn delete(&self, resource: &ClusterResource) -> Result<(), ClusterError> {
        info!("Deleting {resource}");
        match resource {
            ClusterResource::Namespace(name) => {
                self.kubectl([
                    "delete",
                    "namespace",
                    name.as_str(),
                    "--ignore-not-found",
                    "--wait=true",
                ])
                .await?
                .checked()?;
            }
            ClusterResource::Cluster(name) => {
                self.kind(owned(["delete", "cluster", "--name", name.as_str()]))
                    .await?
                    .checked()?;
            }
            ClusterResource::BuildCache(dir) => match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(ClusterError::FileSystem {
                        path: dir.clone(),
                        source: e,
                    })
                }
            },
        }
        Ok(())
    }
}
