//! Builds the provider batch from a loaded manifest.

use crate::config::{ActionDecl, EnsureDecl, GroupDecl, Manifest, PackageDecl};
use anyhow::{anyhow, Result};
use chocokit::{ChocoClient, PackageAction, PackageProvider, PackageSpec};
use convergence::BoxedProvider;
use groupkit::{GroupProvider, GroupSpec};
use shellkit::{ArchContext, Architecture, CommandRunner, RedirectionControl};
use std::sync::Arc;

/// The redirection toggle for this host: the real WoW64 calls on
/// Windows, an in-memory stand-in elsewhere.
#[cfg(windows)]
fn redirection_control() -> Arc<dyn RedirectionControl> {
    Arc::new(shellkit::Wow64Redirection)
}

#[cfg(not(windows))]
fn redirection_control() -> Arc<dyn RedirectionControl> {
    Arc::new(shellkit::VirtualRedirection::new())
}

/// Build one provider per declared group and one per package batch.
///
/// Package entries sharing action, options, source, and architecture are
/// batched into a single provider so the underlying choco calls stay
/// minimal; declaration order is preserved within and across batches.
pub fn build_providers(
    manifest: &Manifest,
    runner: Arc<dyn CommandRunner>,
) -> Result<Vec<BoxedProvider>> {
    let mut providers: Vec<BoxedProvider> = Vec::new();

    for group in &manifest.groups {
        providers.push(Box::new(group_provider(group, Arc::clone(&runner))));
    }

    for batch in batch_packages(&manifest.packages) {
        providers.push(package_provider(&batch, Arc::clone(&runner))?);
    }

    Ok(providers)
}

fn group_provider(decl: &GroupDecl, runner: Arc<dyn CommandRunner>) -> GroupProvider {
    let mut spec = match decl.ensure {
        EnsureDecl::Present => GroupSpec::present(&decl.name),
        EnsureDecl::Absent => GroupSpec::absent(&decl.name),
    };
    if let Some(gid) = &decl.gid {
        spec = spec.with_gid(gid);
    }
    GroupProvider::new(spec, runner)
}

/// One batch of package entries dispatched as a single provider.
#[derive(Debug, Clone)]
struct PackageBatch {
    entries: Vec<PackageDecl>,
}

/// Group entries by (action, options, source, architecture), first-seen
/// order.
fn batch_packages(packages: &[PackageDecl]) -> Vec<PackageBatch> {
    let mut batches: Vec<PackageBatch> = Vec::new();

    for decl in packages {
        let slot = batches.iter_mut().find(|batch| {
            let head = &batch.entries[0];
            head.action == decl.action
                && head.options == decl.options
                && head.source == decl.source
                && head.architecture == decl.architecture
        });

        match slot {
            Some(batch) => batch.entries.push(decl.clone()),
            None => batches.push(PackageBatch {
                entries: vec![decl.clone()],
            }),
        }
    }

    batches
}

fn package_provider(
    batch: &PackageBatch,
    runner: Arc<dyn CommandRunner>,
) -> Result<BoxedProvider> {
    let head = &batch.entries[0];
    let names = batch.entries.iter().map(|e| e.name.clone()).collect();
    let versions = batch.entries.iter().map(|e| e.version.clone()).collect();

    let action = match head.action {
        ActionDecl::Install => PackageAction::Install,
        ActionDecl::Upgrade => PackageAction::Upgrade,
        ActionDecl::Remove => PackageAction::Remove,
        ActionDecl::Purge => PackageAction::Purge,
    };

    let mut spec = match action {
        PackageAction::Install => PackageSpec::install(names),
        PackageAction::Upgrade => PackageSpec::upgrade(names),
        PackageAction::Remove => PackageSpec::remove(names),
        PackageAction::Purge => PackageSpec::purge(names),
    }
    .with_versions(versions);

    if let Some(options) = &head.options {
        spec = spec.with_options(options);
    }
    if let Some(source) = &head.source {
        spec = spec.with_source(source);
    }

    let mut client = ChocoClient::new(runner, ArchContext::detect(redirection_control()));
    if let Some(arch) = &head.architecture {
        let arch: Architecture = arch.parse().map_err(|e| anyhow!("{e}"))?;
        spec = spec.with_architecture(arch);
        client = client.with_architecture(arch);
    }

    Ok(Box::new(PackageProvider::new(spec, client)))
}
