// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/registry.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the job registry of the proxy, located in the jobs
// subdirectory. It owns the active job set, the extranonce session, the share
// target, the merkle resolution index and the downstream tail allocator for
// one upstream session.
//
// Tree Location:
// - src/jobs/registry.rs (job registry)
// - Depends on: tokio, log, crate::core, crate::jobs

use crate::core::difficulty::{U256, diff1_target, difficulty_to_target, target_to_hex};
use crate::core::types::{Algorithm, Args, MerkleHash};
use crate::jobs::error::RegistryError;
use crate::jobs::extranonce::ExtranonceSession;
use crate::jobs::hook::BlockNotifyCommand;
use crate::jobs::job::{Job, JobBroadcast};
use crate::jobs::notify::{CleanJobNotifier, CleanJobSubscription};
use crate::jobs::tail::{Tail, TailAllocator};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const LOG_TARGET: &str = "graxil::proxy::registry";

/// Registry shared between the upstream session and downstream connections
pub type SharedRegistry = Arc<RwLock<JobRegistry>>;

/// Construction parameters of a registry
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    pub algorithm: Algorithm,
    pub blocknotify_cmd: Option<String>,
}

impl From<&Args> for RegistryConfig {
    fn from(args: &Args) -> Self {
        Self {
            algorithm: args.algorithm(),
            blocknotify_cmd: args.blocknotify_cmd.clone(),
        }
    }
}

/// Job and extranonce2 a submitted share was built from
#[derive(Debug, Clone)]
pub struct MerkleResolution {
    pub job: Arc<Job>,
    pub extranonce2: u32,
}

/// Job state of one upstream session
#[derive(Debug)]
pub struct JobRegistry {
    algorithm: Algorithm,
    block_notify: Option<BlockNotifyCommand>,
    session: Option<ExtranonceSession>,
    target: U256,
    target_hex: String,
    difficulty: f64,
    diff1_target_hex: String,
    jobs: Vec<Arc<Job>>,
    // only holds hashes of jobs in `jobs`
    merkle_index: HashMap<MerkleHash, Arc<Job>>,
    on_block: CleanJobNotifier,
    tails: TailAllocator,
}

impl JobRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let target = diff1_target(config.algorithm);
        let target_hex = target_to_hex(&target);
        Self {
            algorithm: config.algorithm,
            block_notify: config.blocknotify_cmd.map(BlockNotifyCommand::new),
            session: None,
            target,
            diff1_target_hex: target_hex.clone(),
            target_hex,
            difficulty: 1.0,
            jobs: Vec::new(),
            merkle_index: HashMap::new(),
            on_block: CleanJobNotifier::new(),
            tails: TailAllocator::new(),
        }
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Replace the extranonce parameters assigned by the pool
    pub fn set_extranonce(&mut self, extranonce1_hex: &str, extranonce2_size: usize) -> Result<(), RegistryError> {
        let session = ExtranonceSession::new(extranonce1_hex, extranonce2_size)?;
        info!(target: LOG_TARGET,
            "Set extranonce: {}/{}",
            session.extranonce1_hex(),
            session.extranonce2_size()
        );
        self.session = Some(session);
        Ok(())
    }

    /// Replace the share target, active jobs are left untouched
    pub fn set_difficulty(&mut self, difficulty: f64) -> Result<(), RegistryError> {
        let target = difficulty_to_target(difficulty, self.algorithm)?;
        self.target_hex = target_to_hex(&target);
        self.target = target;
        self.difficulty = difficulty;
        info!(target: LOG_TARGET, "Set difficulty {} (target {})", difficulty, self.target_hex);
        Ok(())
    }

    /// Make `job` the newest active job.
    ///
    /// With `clean_jobs` every other job is dropped together with its merkle
    /// resolutions, the clean-job waiters are released and the blocknotify
    /// command is started.
    pub fn add_template(&mut self, job: Job, clean_jobs: bool) -> Arc<Job> {
        let job = Arc::new(job);

        if !clean_jobs {
            self.jobs.push(Arc::clone(&job));
            debug!(target: LOG_TARGET, "Added job {} ({} active)", job.job_id, self.jobs.len());
            return job;
        }

        let evicted = std::mem::replace(&mut self.jobs, vec![Arc::clone(&job)]);
        let pruned = self.prune_index(&evicted);
        let released = self.on_block.fire(&job.job_id, &job.prev_hash);
        info!(target: LOG_TARGET,
            "New block {} with job {}: dropped {} jobs and {} resolutions, woke {} waiters",
            job.prev_hash,
            job.job_id,
            evicted.len(),
            pruned,
            released
        );

        if let Some(ref cmd) = self.block_notify {
            cmd.spawn(&job.prev_hash);
        }
        job
    }

    /// Build a job from a pool broadcast at the current difficulty and add it
    pub fn add_broadcast(&mut self, broadcast: &JobBroadcast) -> Result<Arc<Job>, RegistryError> {
        let job = Job::build_from_broadcast(broadcast, self.difficulty)?;
        Ok(self.add_template(job, broadcast.clean_jobs))
    }

    fn prune_index(&mut self, evicted: &[Arc<Job>]) -> usize {
        let mut pruned = 0;
        for job in evicted {
            for hash in job.resolution_hashes() {
                let owned = self
                    .merkle_index
                    .get(&hash)
                    .is_some_and(|indexed| Arc::ptr_eq(indexed, job));
                if owned {
                    self.merkle_index.remove(&hash);
                    pruned += 1;
                }
            }
        }
        pruned
    }

    /// First active job with `job_id`, in issuance order
    pub fn get_job_from_id(&self, job_id: &str) -> Option<Arc<Job>> {
        self.jobs.iter().find(|job| job.job_id == job_id).cloned()
    }

    /// Remember which extranonce2 produced `merkle_hash` on `job`
    pub fn register_merkle(&mut self, job: &Arc<Job>, merkle_hash: MerkleHash, extranonce2: u32) {
        job.record_resolution(merkle_hash, extranonce2);
        if self.is_active(job) {
            self.merkle_index.insert(merkle_hash, Arc::clone(job));
        } else {
            debug!(target: LOG_TARGET,
                "Job {} is no longer active, merkle {} not indexed",
                job.job_id,
                merkle_hash
            );
        }
    }

    /// Resolve a submitted block header (hex) to its job and extranonce2.
    ///
    /// Ok(None) means the share belongs to an unknown or dropped job.
    pub fn get_job_from_header(&self, header_hex: &str) -> Result<Option<MerkleResolution>, RegistryError> {
        let malformed = || RegistryError::MalformedHeader { len: header_hex.len() };
        let merkle_hex = header_hex.get(72..136).ok_or_else(malformed)?;
        let merkle_hash = MerkleHash::from_hex(merkle_hex).map_err(|_| malformed())?;

        let resolution = self.merkle_index.get(&merkle_hash).and_then(|job| {
            job.resolution(&merkle_hash).map(|extranonce2| MerkleResolution {
                job: Arc::clone(job),
                extranonce2,
            })
        });
        if resolution.is_none() {
            debug!(target: LOG_TARGET, "No job for merkle {}", merkle_hash);
        }
        Ok(resolution)
    }

    /// Claim a tail for a new downstream connection.
    ///
    /// Returns the tail hex and how many extranonce2 bytes remain for the miner.
    pub fn acquire_tail(&mut self) -> Result<(String, usize), RegistryError> {
        let size = self.session_extranonce2_size()?;
        let tail = self.tails.acquire(size.min(2))?;
        Ok((tail.to_hex(), size - tail.width()))
    }

    /// Give back the tail of a closed downstream connection
    pub fn release_tail(&mut self, tail_hex: &str) -> Result<bool, RegistryError> {
        let tail = Tail::from_hex(tail_hex)?;
        Ok(self.tails.release(tail))
    }

    pub fn build_full_extranonce(&self, extranonce2: u32) -> Result<Vec<u8>, RegistryError> {
        self.session()?.build_full_extranonce(extranonce2)
    }

    pub fn extranonce2_padding(&self, extranonce2: u32) -> Result<Vec<u8>, RegistryError> {
        self.session()?.pad(extranonce2)
    }

    /// Wait handle released by the next clean-jobs broadcast
    pub fn subscribe_clean_jobs(&self) -> CleanJobSubscription {
        self.on_block.subscribe()
    }

    pub fn block_generation(&self) -> u64 {
        self.on_block.generation()
    }

    pub fn active_jobs(&self) -> Vec<Arc<Job>> {
        self.jobs.clone()
    }

    pub fn last_job(&self) -> Option<Arc<Job>> {
        self.jobs.last().cloned()
    }

    pub fn indexed_merkle_count(&self) -> usize {
        self.merkle_index.len()
    }

    pub fn issued_tail_count(&self) -> usize {
        self.tails.issued_count()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn target(&self) -> U256 {
        self.target
    }

    pub fn target_hex(&self) -> &str {
        &self.target_hex
    }

    pub fn diff1_target_hex(&self) -> &str {
        &self.diff1_target_hex
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn extranonce1_hex(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.extranonce1_hex())
    }

    pub fn extranonce2_size(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.extranonce2_size())
    }

    fn session(&self) -> Result<&ExtranonceSession, RegistryError> {
        self.session.as_ref().ok_or(RegistryError::ExtranonceNotSet)
    }

    fn session_extranonce2_size(&self) -> Result<usize, RegistryError> {
        match self.session()?.extranonce2_size() {
            0 => Err(RegistryError::ExtranonceNotSet),
            size => Ok(size),
        }
    }

    fn is_active(&self, job: &Arc<Job>) -> bool {
        self.jobs.iter().any(|active| Arc::ptr_eq(active, job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(job_id: &str, prev_hash: &str) -> Job {
        let broadcast = JobBroadcast {
            job_id: job_id.to_string(),
            prev_hash: prev_hash.to_string(),
            coinb1: "0100".to_string(),
            coinb2: "ff".to_string(),
            merkle_branch: Vec::new(),
            version: "20000000".to_string(),
            nbits: "1d00ffff".to_string(),
            ntime: "504e86ed".to_string(),
            clean_jobs: false,
        };
        Job::build_from_broadcast(&broadcast, 1.0).unwrap()
    }

    fn header_with(merkle_hex: &str) -> String {
        format!("{}{}{}", "20000000", "00".repeat(32), merkle_hex) + &"00".repeat(12)
    }

    #[test]
    fn test_new_registry_defaults() {
        let registry = JobRegistry::new(RegistryConfig::default());
        assert_eq!(registry.difficulty(), 1.0);
        assert_eq!(
            registry.diff1_target_hex(),
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(registry.target_hex(), registry.diff1_target_hex());
        assert!(registry.last_job().is_none());
        assert!(registry.extranonce2_size().is_none());
    }

    #[test]
    fn test_set_difficulty_keeps_jobs() {
        let mut registry = JobRegistry::new(RegistryConfig {
            algorithm: Algorithm::Scrypt,
            blocknotify_cmd: None,
        });
        registry.add_template(job("a", "00"), true);
        registry.set_difficulty(65536.0).unwrap();
        assert_eq!(
            registry.target_hex(),
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(registry.active_jobs().len(), 1);

        assert!(registry.set_difficulty(0.0).is_err());
        assert_eq!(registry.difficulty(), 65536.0);
    }

    #[test]
    fn test_clean_jobs_eviction() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        let j1 = registry.add_template(job("j1", "01"), true);
        let j2 = registry.add_template(job("j2", "01"), false);
        assert_eq!(registry.active_jobs().len(), 2);
        assert!(Arc::ptr_eq(&registry.last_job().unwrap(), &j2));

        registry.register_merkle(&j1, MerkleHash([1; 32]), 1);
        registry.register_merkle(&j2, MerkleHash([2; 32]), 2);
        assert_eq!(registry.indexed_merkle_count(), 2);

        let j3 = registry.add_template(job("j3", "02"), true);
        let active = registry.active_jobs();
        assert_eq!(active.len(), 1);
        assert!(Arc::ptr_eq(&active[0], &j3));
        assert!(registry.get_job_from_id("j1").is_none());
        assert!(registry.get_job_from_id("j2").is_none());
        assert_eq!(registry.indexed_merkle_count(), 0);
        assert!(registry.get_job_from_header(&header_with(&"01".repeat(32))).unwrap().is_none());
        assert!(registry.get_job_from_header(&header_with(&"02".repeat(32))).unwrap().is_none());
    }

    #[test]
    fn test_get_job_from_id_first_match() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        let first = registry.add_template(job("dup", "00"), true);
        registry.add_template(job("dup", "00"), false);
        let found = registry.get_job_from_id("dup").unwrap();
        assert!(Arc::ptr_eq(&found, &first));
        let again = registry.get_job_from_id("dup").unwrap();
        assert!(Arc::ptr_eq(&found, &again));
    }

    #[test]
    fn test_header_resolution() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        let job = registry.add_template(job("j1", "00"), true);
        let hash = MerkleHash([0xab; 32]);
        registry.register_merkle(&job, hash, 7);

        let header = header_with(&"AB".repeat(32));
        let resolution = registry.get_job_from_header(&header).unwrap().unwrap();
        assert!(Arc::ptr_eq(&resolution.job, &job));
        assert_eq!(resolution.extranonce2, 7);

        assert!(matches!(
            registry.get_job_from_header("0000"),
            Err(RegistryError::MalformedHeader { len: 4 })
        ));
        let bad = header_with(&"zz".repeat(32));
        assert!(matches!(
            registry.get_job_from_header(&bad),
            Err(RegistryError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_register_merkle_on_evicted_job() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        let old = registry.add_template(job("old", "00"), true);
        registry.add_template(job("new", "01"), true);
        registry.register_merkle(&old, MerkleHash([9; 32]), 3);
        assert_eq!(old.resolution(&MerkleHash([9; 32])), Some(3));
        assert_eq!(registry.indexed_merkle_count(), 0);
    }

    #[test]
    fn test_tails_need_extranonce() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        assert!(matches!(registry.acquire_tail(), Err(RegistryError::ExtranonceNotSet)));

        registry.set_extranonce("08000002", 4).unwrap();
        assert_eq!(registry.acquire_tail().unwrap(), ("01".to_string(), 3));
        assert_eq!(registry.issued_tail_count(), 1);
        assert!(registry.release_tail("01").unwrap());
        assert!(!registry.release_tail("01").unwrap());
        assert!(registry.release_tail("0001").is_err());
    }

    #[test]
    fn test_extranonce_builder() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        assert!(matches!(registry.build_full_extranonce(1), Err(RegistryError::ExtranonceNotSet)));
        registry.set_extranonce("08000002", 2).unwrap();
        assert_eq!(registry.extranonce2_padding(0x0102_0304).unwrap(), vec![3, 4]);
        assert_eq!(registry.build_full_extranonce(7).unwrap(), vec![8, 0, 0, 2, 0, 7]);
    }

    #[test]
    fn test_clean_jobs_fire_notification() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        let mut waiter = registry.subscribe_clean_jobs();
        registry.add_template(job("j1", "aa"), false);
        assert!(waiter.try_take().is_none());

        registry.add_template(job("j2", "bb"), true);
        let event = waiter.try_take().unwrap();
        assert_eq!(event.prev_hash, "bb");
        assert_eq!(event.generation, 1);
        assert_eq!(registry.block_generation(), 1);
    }

    #[test]
    fn test_released_waiter_not_woken_by_next_block() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        let mut waiter = registry.subscribe_clean_jobs();
        registry.add_template(job("j1", "aa"), true);
        assert_eq!(waiter.try_take().unwrap().generation, 1);

        registry.add_template(job("j2", "bb"), true);
        assert!(waiter.try_take().is_none());
        assert_eq!(registry.block_generation(), 2);
    }

    #[test]
    fn test_oversized_extranonce2_keeps_session() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        registry.set_extranonce("08000002", 4).unwrap();
        assert!(matches!(
            registry.set_extranonce("08000002", usize::MAX),
            Err(RegistryError::Extranonce2TooLarge { .. })
        ));
        assert_eq!(registry.extranonce2_size(), Some(4));
        assert_eq!(registry.build_full_extranonce(1).unwrap(), vec![8, 0, 0, 2, 0, 0, 0, 1]);
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Initial job registry.
//   - Clean-jobs swaps the active set and prunes the merkle index in one step.
//   - Merkle index only ever points at active jobs.
//   - Tail allocation needs the extranonce session to size the remaining extranonce2.
