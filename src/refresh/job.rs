// Program cache refresh job.
// Fetches every program UUID and detail document, then writes them to the cache.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::cache::{CacheStore, index_key, record_key};
use crate::catalog::{CatalogApi, ClientFactory};
use crate::error::Result;
use crate::sites::{Site, TenancyMode};

use super::report::{IndexWrite, RefreshFailure, RefreshReport};

/// One full pass over the catalog.
///
/// Entries are written with no expiry and only after every fetch has finished,
/// so the index is never observed half-updated. The job should be the only
/// writer of these keys.
pub struct RefreshJob<'a, F, C: ?Sized> {
    factory: &'a F,
    cache: &'a C,
    mode: TenancyMode,
    service_username: String,
    sites: Vec<Site>,
}

impl<'a, F, C> RefreshJob<'a, F, C>
where
    F: ClientFactory,
    C: CacheStore + ?Sized,
{
    pub fn new(
        factory: &'a F,
        cache: &'a C,
        mode: TenancyMode,
        service_username: impl Into<String>,
    ) -> Self {
        Self {
            factory,
            cache,
            mode,
            service_username: service_username.into(),
            sites: Vec::new(),
        }
    }

    /// Sites to refresh in multi-tenant mode. Ignored in single-tenant mode.
    pub fn with_sites(mut self, sites: Vec<Site>) -> Self {
        self.sites = sites;
        self
    }

    /// Run the refresh.
    ///
    /// Returns `Err` only for failures that abort the run: in single-tenant
    /// mode a missing service account or a failed UUID request, and in any
    /// mode a failed cache write. Everything else is recorded in the report.
    pub async fn run(&self) -> Result<RefreshReport> {
        let mut report = RefreshReport::new(self.mode);

        match self.mode {
            TenancyMode::Single => self.run_single(&mut report).await?,
            TenancyMode::Multi => self.run_multi(&mut report).await?,
        }

        report.finish();
        info!(
            mode = %self.mode,
            uuids = report.uuids_received,
            requested = report.programs_requested,
            cached = report.programs_cached,
            indexes = report.indexes.len(),
            failures = report.failures.len(),
            elapsed_ms = report.elapsed().map(|d| d.num_milliseconds()),
            "program cache refresh finished"
        );
        Ok(report)
    }

    async fn run_single(&self, report: &mut RefreshReport) -> Result<()> {
        let mut client = self
            .factory
            .build_client(&self.service_username, None)
            .inspect_err(|e| {
                error!(
                    username = %self.service_username,
                    error = %e,
                    "failed to create catalog API client"
                )
            })?;

        info!("requesting program UUIDs");
        let uuids = client
            .program_uuids()
            .await
            .inspect_err(|e| error!(error = %e, "failed to retrieve program UUIDs"))?;
        info!(total = uuids.len(), "received program UUIDs");
        report.uuids_received += uuids.len();

        let mut batch = ProgramBatch::default();
        batch.fetch(&mut client, &uuids, None, report).await;

        self.write_programs(batch, report)?;
        self.write_index(None, &uuids, report)?;
        Ok(())
    }

    async fn run_multi(&self, report: &mut RefreshReport) -> Result<()> {
        info!(sites = self.sites.len(), "refreshing programs per site");

        let mut batch = ProgramBatch::default();
        let mut site_uuids: Vec<(&Site, Vec<String>)> = Vec::with_capacity(self.sites.len());

        for site in &self.sites {
            let uuids = self.refresh_site(site, &mut batch, report).await;
            site_uuids.push((site, uuids));
        }

        self.write_programs(batch, report)?;
        for (site, uuids) in &site_uuids {
            self.write_index(Some(site), uuids, report)?;
        }
        Ok(())
    }

    /// Fetch one site's UUIDs and any details not yet retrieved this run.
    ///
    /// Returns the site's UUID list, empty if the site could not be read.
    async fn refresh_site(
        &self,
        site: &Site,
        batch: &mut ProgramBatch,
        report: &mut RefreshReport,
    ) -> Vec<String> {
        info!(site = %site.name, "refreshing site");

        let mut client = match self.factory.build_client(&self.service_username, Some(site)) {
            Ok(client) => client,
            Err(e) => {
                error!(
                    site = %site.name,
                    username = %self.service_username,
                    error = %e,
                    "failed to create catalog API client, skipping site"
                );
                report.record(RefreshFailure::Client {
                    site: Some(site.name.clone()),
                    error: e.to_string(),
                });
                return Vec::new();
            }
        };

        info!(site = %site.name, "requesting program UUIDs");
        let uuids = match client.program_uuids().await {
            Ok(uuids) => uuids,
            Err(e) => {
                error!(site = %site.name, error = %e, "failed to retrieve program UUIDs");
                report.record(RefreshFailure::ProgramIndex {
                    site: Some(site.name.clone()),
                    error: e.to_string(),
                });
                return Vec::new();
            }
        };
        info!(site = %site.name, total = uuids.len(), "received program UUIDs");
        report.uuids_received += uuids.len();

        batch
            .fetch(&mut client, &uuids, Some(&site.name), report)
            .await;
        uuids
    }

    fn write_programs(&self, batch: ProgramBatch, report: &mut RefreshReport) -> Result<()> {
        let successful = batch.programs.len();
        info!(successful, "caching program details");
        self.cache.set_many(&batch.programs, None)?;
        report.programs_cached = successful;
        Ok(())
    }

    fn write_index(
        &self,
        site: Option<&Site>,
        uuids: &[String],
        report: &mut RefreshReport,
    ) -> Result<()> {
        let site_name = site.map(|s| s.name.as_str());
        let key = index_key(self.mode, site_name);
        info!(total = uuids.len(), site = site_name, key = %key, "caching program UUIDs");

        self.cache.set(&key, &serde_json::to_value(uuids)?, None)?;
        report.indexes.push(IndexWrite {
            key,
            site: site_name.map(str::to_string),
            count: uuids.len(),
        });
        Ok(())
    }
}

/// Detail documents gathered during a run, keyed by cache key.
#[derive(Default)]
struct ProgramBatch {
    programs: BTreeMap<String, Value>,
}

impl ProgramBatch {
    /// Fetch details for `uuids`, skipping any already retrieved this run.
    ///
    /// A UUID whose request failed is requested again if a later site lists it.
    async fn fetch<A: CatalogApi>(
        &mut self,
        client: &mut A,
        uuids: &[String],
        site: Option<&str>,
        report: &mut RefreshReport,
    ) {
        for uuid in uuids {
            let key = record_key(uuid);
            if self.programs.contains_key(&key) {
                debug!(%uuid, "program already retrieved this run");
                continue;
            }

            debug!(%uuid, "requesting program details");
            report.programs_requested += 1;

            match client.program(uuid).await {
                Ok(document) => {
                    self.programs.insert(key, document);
                }
                Err(e) => {
                    error!(%uuid, site, error = %e, "failed to retrieve program details");
                    report.record(RefreshFailure::ProgramDetail {
                        uuid: uuid.clone(),
                        site: site.map(str::to_string),
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}
