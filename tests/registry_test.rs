// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: tests/registry_test.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file contains tests for the job registry public API: clean-job
// lifecycle, share resolution, tail multiplexing, the clean-job broadcast and
// the blocknotify command hook.

#[cfg(test)]
mod tests {
    use graxil_proxy::core::types::{Algorithm, MerkleHash};
    use graxil_proxy::jobs::RegistryError;
    use graxil_proxy::{Job, JobBroadcast, JobRegistry, RegistryConfig};
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn broadcast(job_id: &str, prev_hash: &str, clean_jobs: bool) -> JobBroadcast {
        JobBroadcast {
            job_id: job_id.to_string(),
            prev_hash: prev_hash.to_string(),
            coinb1: "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff20020862062f503253482f04b8864e5008".to_string(),
            coinb2: "072f736c7573682f000000000100f2052a010000001976a914d23fcdf86f7e756a64a7a9688ef9903327048ed988ac00000000".to_string(),
            merkle_branch: Vec::new(),
            version: "00000002".to_string(),
            nbits: "1c2ac4af".to_string(),
            ntime: "504e86b9".to_string(),
            clean_jobs,
        }
    }

    fn job(job_id: &str, prev_hash: &str) -> Job {
        Job::build_from_broadcast(&broadcast(job_id, prev_hash, false), 1.0).unwrap()
    }

    fn header(merkle_hex: &str) -> String {
        format!("00000002{}{}504e86b91c2ac4af00000000", "00".repeat(32), merkle_hex)
    }

    #[test]
    fn test_difficulty_one_target_hex() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        registry.set_difficulty(1.0).unwrap();
        assert_eq!(
            registry.target_hex(),
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );

        let mut scrypt = JobRegistry::new(RegistryConfig {
            algorithm: Algorithm::Scrypt,
            blocknotify_cmd: None,
        });
        scrypt.set_difficulty(1.0).unwrap();
        assert_eq!(
            scrypt.target_hex(),
            "0000ffff00000000000000000000000000000000000000000000000000000000"
        );
        assert!(matches!(scrypt.set_difficulty(-3.0), Err(RegistryError::InvalidDifficulty(_))));
    }

    #[test]
    fn test_clean_broadcast_drops_older_jobs_and_resolutions() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        let j1 = registry.add_template(job("J1", "01"), true);
        let j2 = registry.add_template(job("J2", "01"), false);
        registry.register_merkle(&j1, MerkleHash([0x11; 32]), 1);
        registry.register_merkle(&j2, MerkleHash([0x22; 32]), 2);
        assert!(registry.get_job_from_header(&header(&"11".repeat(32))).unwrap().is_some());

        let j3 = registry.add_template(job("J3", "02"), true);

        let active = registry.active_jobs();
        assert_eq!(active.len(), 1);
        assert!(Arc::ptr_eq(&active[0], &j3));
        assert!(registry.get_job_from_id("J1").is_none());
        assert!(registry.get_job_from_id("J2").is_none());
        assert!(registry.get_job_from_header(&header(&"11".repeat(32))).unwrap().is_none());
        assert!(registry.get_job_from_header(&header(&"22".repeat(32))).unwrap().is_none());
    }

    #[test]
    fn test_header_resolves_registered_merkle() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        let j = registry.add_template(job("J", "01"), true);
        let merkle_hex = "5ba0b5e40e0a3e7ae1d6c3e6a8f0f0ab3b9d2b2f5c2d6f6c8b8b7a2e1f0d9c8b";
        registry.register_merkle(&j, MerkleHash::from_hex(merkle_hex).unwrap(), 7);

        let resolution = registry
            .get_job_from_header(&header(&merkle_hex.to_uppercase()))
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&resolution.job, &j));
        assert_eq!(resolution.extranonce2, 7);

        // unknown hash is a normal outcome, short header is not
        assert!(registry.get_job_from_header(&header(&"ee".repeat(32))).unwrap().is_none());
        assert!(registry.get_job_from_header(&header(&"ee".repeat(30))).is_err());
    }

    #[test]
    fn test_get_job_from_id_is_idempotent() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        registry.add_template(job("a", "01"), true);
        registry.add_template(job("b", "01"), false);
        let first = registry.get_job_from_id("b").unwrap();
        let second = registry.get_job_from_id("b").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.get_job_from_id("missing").is_none());
        assert!(registry.get_job_from_id("missing").is_none());
    }

    #[test]
    fn test_tail_capacity() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        registry.set_extranonce("f8002c90", 4).unwrap();

        let mut tails = HashSet::new();
        for _ in 0..65535 {
            let (tail, remaining) = registry.acquire_tail().unwrap();
            assert_ne!(tail, "00");
            assert_eq!(remaining, 4 - tail.len() / 2);
            assert!(tails.insert(tail));
        }
        assert!(matches!(registry.acquire_tail(), Err(RegistryError::TailsExhausted)));

        assert!(registry.release_tail("0a").unwrap());
        assert_eq!(registry.acquire_tail().unwrap().0, "0a");
        assert!(matches!(registry.acquire_tail(), Err(RegistryError::TailsExhausted)));
    }

    #[test]
    fn test_extranonce_reassignment_mid_session() {
        let mut registry = JobRegistry::new(RegistryConfig::default());
        registry.set_extranonce("f8002c90", 4).unwrap();
        registry.set_extranonce("0a0b", 8).unwrap();
        assert_eq!(registry.extranonce1_hex(), Some("0a0b"));
        assert_eq!(
            registry.build_full_extranonce(0x01020304).unwrap(),
            vec![0x0a, 0x0b, 0, 0, 0, 0, 1, 2, 3, 4]
        );
        assert!(registry.set_extranonce("xyz", 4).is_err());
        assert_eq!(registry.extranonce1_hex(), Some("0a0b"));
    }

    #[tokio::test]
    async fn test_clean_broadcast_wakes_waiters_without_replay() {
        let shared = JobRegistry::new(RegistryConfig::default()).into_shared();

        let mut waiters = Vec::new();
        for _ in 0..4 {
            let subscription = shared.read().await.subscribe_clean_jobs();
            waiters.push(tokio::spawn(subscription.wait()));
        }

        shared.write().await.add_template(job("J1", "01"), false);
        shared.write().await.add_template(job("J2", "ab"), true);

        for waiter in waiters {
            let block = waiter.await.unwrap().unwrap();
            assert_eq!(block.prev_hash, "ab");
            assert_eq!(block.job_id, "J2");
        }

        let mut late = shared.read().await.subscribe_clean_jobs();
        assert!(late.try_take().is_none());
        shared.write().await.add_template(job("J3", "cd"), true);
        assert_eq!(late.try_take().unwrap().generation, 2);
    }

    #[tokio::test]
    async fn test_readers_never_see_half_swapped_jobs() {
        let shared = JobRegistry::new(RegistryConfig::default()).into_shared();
        {
            let mut registry = shared.write().await;
            let j = registry.add_template(job("j0", "00"), true);
            registry.register_merkle(&j, MerkleHash([0; 32]), 0);
        }

        let writer = {
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                for i in 1..200u32 {
                    let mut registry = shared.write().await;
                    let j = registry.add_template(job(&format!("j{}", i), "00"), true);
                    let mut hash = [0u8; 32];
                    hash[..4].copy_from_slice(&i.to_be_bytes());
                    registry.register_merkle(&j, MerkleHash(hash), i);
                }
            })
        };

        for _ in 0..200 {
            let registry = shared.read().await;
            let active = registry.active_jobs();
            assert_eq!(active.len(), 1);
            assert!(registry.indexed_merkle_count() <= 1);
            drop(registry);
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_blocknotify_command_runs_with_prev_hash() {
        let dir = tempdir().expect("Failed to create temporary directory");
        let output = dir.path().join("block.txt");
        let mut registry = JobRegistry::new(RegistryConfig {
            algorithm: Algorithm::Sha256,
            blocknotify_cmd: Some(format!("echo %s > {}", output.display())),
        });

        let prev_hash = "4d16b6f85af6e2198f44ae2a6de67f78487ae5611b77c6c0440b921e00000000";
        registry.add_template(job("J1", prev_hash), false);
        registry.add_template(job("J2", prev_hash), true);

        let mut contents = String::new();
        for _ in 0..50 {
            if let Ok(text) = std::fs::read_to_string(&output) {
                if text.ends_with('\n') {
                    contents = text;
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(contents.trim(), prev_hash);
    }
}

// Changelog:
// - v1.0.0 (2026-10-16): Registry API tests.
//   - Clean-job lifecycle, header resolution, tail capacity and broadcast fan-out.
//   - Blocknotify command checked against a temporary output file.
