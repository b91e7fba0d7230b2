//! Lease engine
//!
//! One `lease_jobs` call serves one worker cluster's lease RPC. Phase one
//! slices the request's resources across queues in inverse proportion to
//! their effective priority, capped by each queue's remaining scheduling
//! limit. Phase two drains queues against those shares in passes: peek jobs,
//! filter on node labels and resource fit, claim a batch atomically through
//! the repository, and after each pass hand the share of queues that can
//! place nothing to the queues still hungry. The engine stops ahead of the
//! call deadline by a configured safety margin and never rolls back a
//! granted lease.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use armada_core::{
    aggregate_queue_usage, sum_capacity, ComputeResourcesFloat, DomainError, Job, JobId,
    LeaseRequest, Queue,
};
use armada_ports::{JobQueueError, JobQueueRepository, UsageError, UsageRepository};

use crate::config::SchedulingConfig;
use crate::limits::{calculate_queue_scheduling_limits, QueueSchedulingInfo};
use crate::priority::{
    calculate_queue_priority, resource_scarcity, QueuePriorityInfo, MIN_PRIORITY,
};

/// Why a lease call stopped handing out jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseOutcome {
    /// A full pass over every queue placed nothing and moved no share.
    NoProgress,
    /// The remaining resources cannot fit the minimum job size.
    Exhausted,
    /// The soft deadline was reached; the response is a valid partial result.
    DeadlineExceeded,
    /// The per-call cap on scheduled jobs was reached.
    JobLimitReached,
}

/// Jobs granted by one lease call, plus why the call stopped.
#[derive(Debug)]
pub struct LeaseResult {
    pub jobs: Vec<Job>,
    pub outcome: LeaseOutcome,
}

/// Fatal lease call failure. Transient repository trouble is retried and
/// then narrowed to skipping the affected queue, never surfaced here.
#[derive(thiserror::Error, Debug)]
pub enum LeaseError {
    #[error("invalid lease request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("usage snapshot unavailable: {0}")]
    Usage(#[from] UsageError),
}

/// True when every label the job requires is carried by a single
/// node-labeling group advertised in the request.
pub fn match_requirements(job: &Job, request: &LeaseRequest) -> bool {
    if job.required_node_labels.is_empty() {
        return true;
    }
    request.available_labels.iter().any(|group| {
        job.required_node_labels
            .iter()
            .all(|(key, value)| group.labels.get(key) == Some(value))
    })
}

fn priority_of(priorities: &BTreeMap<String, QueuePriorityInfo>, queue: &str) -> f64 {
    priorities
        .get(queue)
        .map(|info| info.priority)
        .unwrap_or(MIN_PRIORITY)
}

/// Phase one: give every queue its inverse-priority proportional slice of
/// `quantity_to_slice`, capped by its remaining scheduling limit.
pub fn slice_resources(
    priorities: &BTreeMap<String, QueuePriorityInfo>,
    scheduling_info: &mut BTreeMap<String, QueueSchedulingInfo>,
    quantity_to_slice: &ComputeResourcesFloat,
) {
    let inverse_sum: f64 = scheduling_info
        .keys()
        .map(|queue| 1.0 / priority_of(priorities, queue))
        .sum();
    if inverse_sum <= 0.0 {
        return;
    }
    for (queue, info) in scheduling_info.iter_mut() {
        let fraction = (1.0 / priority_of(priorities, queue)) / inverse_sum;
        let share = quantity_to_slice
            .mul(fraction)
            .limit_to(&info.remaining_scheduling_limit);
        info.update_share(share);
    }
}

/// Whether a queue's remaining limit leaves room in at least one resource
/// the request actually offers. Queues without any are dropped up front.
fn has_headroom_for_request(
    info: &QueueSchedulingInfo,
    requested: &ComputeResourcesFloat,
) -> bool {
    requested
        .0
        .iter()
        .filter(|(_, offered)| **offered > 0.0)
        .any(
            |(resource, _)| match info.remaining_scheduling_limit.0.get(resource) {
                Some(limit) => *limit > 0.0,
                None => true,
            },
        )
}

enum RetireReason {
    /// The repository has nothing left in this queue.
    Empty,
    /// Nothing at the head of the queue can ever be placed in this call.
    Blocked,
    /// The repository kept failing for this queue.
    Failed,
}

enum QueueDisposition {
    /// The queue may still place work later in this call. `share_blocked`
    /// marks a candidate that fits the cluster but not the queue's share,
    /// making the queue a redistribution recipient.
    Active { share_blocked: bool },
    Retired(RetireReason),
}

/// All mutable state of one lease call. Nothing here outlives the call.
pub struct LeaseContext<'a, R: JobQueueRepository + ?Sized> {
    config: &'a SchedulingConfig,
    repository: &'a R,
    request: &'a LeaseRequest,
    priorities: BTreeMap<String, QueuePriorityInfo>,
    scheduling_info: BTreeMap<String, QueueSchedulingInfo>,
    /// Peeked-but-unclaimed jobs per queue, refilled only when empty.
    queue_cache: HashMap<String, VecDeque<Job>>,
    /// Cluster-wide resources still open in this call.
    remaining: ComputeResourcesFloat,
    minimum_job_size: ComputeResourcesFloat,
    soft_deadline: Option<Instant>,
    leased: Vec<Job>,
}

impl<'a, R: JobQueueRepository + ?Sized> LeaseContext<'a, R> {
    /// Build the per-call state. `deadline` is the lease RPC's deadline; the
    /// engine stops a configured safety margin ahead of it. Callers normally
    /// go through [`lease_jobs`].
    pub fn new(
        config: &'a SchedulingConfig,
        repository: &'a R,
        request: &'a LeaseRequest,
        priorities: BTreeMap<String, QueuePriorityInfo>,
        scheduling_info: BTreeMap<String, QueueSchedulingInfo>,
        deadline: Option<Instant>,
    ) -> Self {
        let minimum_job_size = if request.minimum_job_size.is_empty() {
            config.minimum_job_size.as_float()
        } else {
            request.minimum_job_size.as_float()
        };
        let soft_deadline =
            deadline.and_then(|d| d.checked_sub(config.lease_deadline_safety_margin()));
        Self {
            config,
            repository,
            request,
            priorities,
            scheduling_info,
            queue_cache: HashMap::new(),
            remaining: request.resources.as_float(),
            minimum_job_size,
            soft_deadline,
            leased: Vec::new(),
        }
    }

    fn deadline_reached(&self) -> bool {
        self.soft_deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    fn minimum_job_fits_remaining(&self) -> bool {
        self.minimum_job_size.is_empty()
            || self.minimum_job_size.is_less_or_equal(&self.remaining)
    }

    /// Queues still in rotation, worst priority last, ties by name.
    fn queue_order(&self, retired: &BTreeSet<String>) -> Vec<String> {
        let mut order: Vec<String> = self
            .scheduling_info
            .keys()
            .filter(|queue| !retired.contains(*queue))
            .cloned()
            .collect();
        order.sort_by(|a, b| {
            priority_of(&self.priorities, a)
                .partial_cmp(&priority_of(&self.priorities, b))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
        order
    }

    async fn peek_with_retry(&self, queue: &str) -> Result<Vec<Job>, JobQueueError> {
        let limit = self.config.queue_lease_batch_size as i64;
        let mut attempt = 1;
        loop {
            match self.repository.peek_queue(queue, limit).await {
                Ok(jobs) => return Ok(jobs),
                Err(e) if e.is_transient() && attempt < self.config.max_repository_retries => {
                    warn!(queue, attempt, error = %e, "peek failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_lease_with_retry(
        &self,
        queue: &str,
        candidates: &[Job],
    ) -> Result<Vec<Job>, JobQueueError> {
        let mut attempt = 1;
        loop {
            match self
                .repository
                .try_lease_jobs(&self.request.cluster_id, queue, candidates)
                .await
            {
                Ok(leased) => return Ok(leased),
                Err(e) if e.is_transient() && attempt < self.config.max_repository_retries => {
                    warn!(queue, attempt, error = %e, "lease attempt failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Drain one queue against its adjusted share until the batch source or
    /// the share runs dry. Returns the number of jobs leased here and what
    /// to do with the queue afterwards.
    async fn drain_queue(&mut self, queue: &str) -> (usize, QueueDisposition) {
        let mut leased_now = 0;
        let mut share_blocked = false;

        loop {
            if self.deadline_reached() {
                return (leased_now, QueueDisposition::Active { share_blocked });
            }
            let budget = self
                .config
                .maximum_jobs_to_schedule
                .saturating_sub(self.leased.len());
            if budget == 0 {
                return (leased_now, QueueDisposition::Active { share_blocked });
            }

            if self.queue_cache.get(queue).map_or(true, VecDeque::is_empty) {
                match self.peek_with_retry(queue).await {
                    Ok(jobs) if jobs.is_empty() => {
                        return (leased_now, QueueDisposition::Retired(RetireReason::Empty))
                    }
                    Ok(jobs) => {
                        self.queue_cache.insert(queue.to_string(), jobs.into());
                    }
                    Err(e) => {
                        error!(queue, error = %e, "skipping queue after repeated repository failures");
                        return (leased_now, QueueDisposition::Retired(RetireReason::Failed));
                    }
                }
            }

            // Walk the cached head of the queue, accumulating a batch that
            // fits both the queue's share and the call's remaining resources.
            let mut candidates: Vec<Job> = Vec::new();
            {
                let Some(cache) = self.queue_cache.get(queue) else {
                    return (leased_now, QueueDisposition::Retired(RetireReason::Empty));
                };
                let Some(info) = self.scheduling_info.get(queue) else {
                    return (leased_now, QueueDisposition::Retired(RetireReason::Empty));
                };
                let batch_cap = self.config.queue_lease_batch_size.min(budget);
                let mut share = info.adjusted_share.clone();
                let mut cluster_remaining = self.remaining.clone();
                for job in cache {
                    if candidates.len() >= batch_cap {
                        break;
                    }
                    if !match_requirements(job, self.request) {
                        continue;
                    }
                    let request = job.total_resource_request().as_float();
                    let mut within_cluster = cluster_remaining.clone();
                    within_cluster.sub(&request);
                    if !within_cluster.is_valid() {
                        // Too big for what is left of the cluster this call.
                        continue;
                    }
                    let mut within_share = share.clone();
                    within_share.sub(&request);
                    if !within_share.is_valid() {
                        share_blocked = true;
                        continue;
                    }
                    share = within_share;
                    cluster_remaining = within_cluster;
                    candidates.push(job.clone());
                }
            }

            if candidates.is_empty() {
                if share_blocked {
                    return (leased_now, QueueDisposition::Active { share_blocked });
                }
                return (leased_now, QueueDisposition::Retired(RetireReason::Blocked));
            }

            let leased = match self.try_lease_with_retry(queue, &candidates).await {
                Ok(leased) => leased,
                Err(e) => {
                    error!(queue, error = %e, "skipping queue after repeated lease failures");
                    return (leased_now, QueueDisposition::Retired(RetireReason::Failed));
                }
            };

            // Candidates the repository did not return were claimed by a
            // concurrent call; drop them from the cache alongside the leased.
            let attempted: BTreeSet<JobId> = candidates.iter().map(|job| job.id).collect();
            if let Some(cache) = self.queue_cache.get_mut(queue) {
                cache.retain(|job| !attempted.contains(&job.id));
            }

            let mut leased_resources = ComputeResourcesFloat::new();
            for job in &leased {
                leased_resources.add(&job.total_resource_request().as_float());
            }
            if let Some(info) = self.scheduling_info.get_mut(queue) {
                info.subtract_leased(&leased_resources);
            }
            self.remaining.sub(&leased_resources);
            self.remaining.limit_to_zero();

            debug!(
                queue,
                attempted = candidates.len(),
                leased = leased.len(),
                "leased batch"
            );
            leased_now += leased.len();
            self.leased.extend(leased);
        }
    }

    /// Hand `pool` to the queues still blocked on share, inverse-priority
    /// proportional, capped by each queue's remaining limit. Returns whether
    /// any share actually moved.
    fn redistribute(&mut self, pool: &ComputeResourcesFloat, recipients: &BTreeSet<String>) -> bool {
        if recipients.is_empty() || !pool.0.values().any(|value| *value > 0.0) {
            return false;
        }
        let inverse_sum: f64 = recipients
            .iter()
            .map(|queue| 1.0 / priority_of(&self.priorities, queue))
            .sum();
        if inverse_sum <= 0.0 {
            return false;
        }
        for queue in recipients {
            let fraction = (1.0 / priority_of(&self.priorities, queue)) / inverse_sum;
            let extra = pool.mul(fraction);
            if let Some(info) = self.scheduling_info.get_mut(queue) {
                let mut share = info.adjusted_share.clone();
                share.add(&extra);
                info.adjusted_share = share.limit_to(&info.remaining_scheduling_limit);
                debug!(queue, share = ?info.adjusted_share, "redistributed remainder");
            }
        }
        true
    }

    /// Phase two: run passes over the queues until nothing moves, the
    /// resources or the job cap run out, or the soft deadline arrives.
    pub async fn schedule_jobs(mut self) -> (Vec<Job>, LeaseOutcome) {
        let mut retired: BTreeSet<String> = BTreeSet::new();

        let outcome = loop {
            if self.deadline_reached() {
                break LeaseOutcome::DeadlineExceeded;
            }
            if !self.minimum_job_fits_remaining() {
                break LeaseOutcome::Exhausted;
            }
            let order = self.queue_order(&retired);
            if order.is_empty() {
                break LeaseOutcome::NoProgress;
            }

            let mut progress = false;
            let mut pool = ComputeResourcesFloat::new();
            let mut recipients: BTreeSet<String> = BTreeSet::new();
            let mut deadline_hit = false;

            for queue in &order {
                if self.deadline_reached() {
                    deadline_hit = true;
                    break;
                }
                let (leased_now, disposition) = self.drain_queue(queue).await;
                progress |= leased_now > 0;

                match disposition {
                    QueueDisposition::Active { share_blocked } => {
                        if share_blocked {
                            recipients.insert(queue.clone());
                        }
                    }
                    QueueDisposition::Retired(reason) => {
                        if let Some(info) = self.scheduling_info.get_mut(queue) {
                            pool.add(&info.adjusted_share);
                            info.adjusted_share = ComputeResourcesFloat::new();
                        }
                        match reason {
                            RetireReason::Empty => debug!(queue, "queue drained"),
                            RetireReason::Blocked => {
                                debug!(queue, "queue blocked for this call, releasing share")
                            }
                            RetireReason::Failed => {}
                        }
                        retired.insert(queue.clone());
                    }
                }

                if self.leased.len() >= self.config.maximum_jobs_to_schedule {
                    return (self.leased, LeaseOutcome::JobLimitReached);
                }
            }

            if deadline_hit {
                break LeaseOutcome::DeadlineExceeded;
            }

            // Remainder distribution: share released by retired queues goes
            // to the queues a larger share would still help.
            let moved = self.redistribute(&pool, &recipients);
            if !progress && !moved {
                break LeaseOutcome::NoProgress;
            }
        };

        (self.leased, outcome)
    }
}

/// Serve one lease call: validate the request, snapshot usage, derive
/// priorities and limits, slice shares and drain the queues. The returned
/// jobs are already claimed for the calling cluster; partial results on
/// deadline are successes, never rolled back.
pub async fn lease_jobs<R, U>(
    repository: &R,
    usage: &U,
    config: &SchedulingConfig,
    queues: &[Queue],
    request: &LeaseRequest,
    deadline: Option<Instant>,
) -> Result<LeaseResult, LeaseError>
where
    R: JobQueueRepository + ?Sized,
    U: UsageRepository + ?Sized,
{
    request.validate()?;

    let reports = usage.cluster_usage_reports().await?;
    let total_capacity = sum_capacity(&reports);
    let scarcity = resource_scarcity(&total_capacity, &config.baseline_resource);
    let usage_by_queue = aggregate_queue_usage(&reports);
    let priorities =
        calculate_queue_priority(queues, &usage_by_queue, &total_capacity, &scarcity);

    let requested = request.resources.as_float();
    let mut scheduling_info = calculate_queue_scheduling_limits(
        queues,
        &config.scheduling_limit_per_queue,
        &config.resource_limit_per_queue,
        &total_capacity,
        &usage_by_queue,
    );
    scheduling_info.retain(|queue, info| {
        let keep = has_headroom_for_request(info, &requested);
        if !keep {
            debug!(queue, "dropping queue without headroom for this request");
        }
        keep
    });
    slice_resources(&priorities, &mut scheduling_info, &requested);

    let context = LeaseContext::new(config, repository, request, priorities, scheduling_info, deadline);
    let (jobs, outcome) = context.schedule_jobs().await;
    info!(
        cluster_id = %request.cluster_id,
        leased = jobs.len(),
        ?outcome,
        "lease call finished"
    );
    Ok(LeaseResult { jobs, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use armada_core::{ComputeResources, Container, NodeLabeling, PodSpec, ResourceRequirements};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn test_job(queue: &str, cpu: &str, memory: &str) -> Job {
        let requests = ComputeResources::from_pairs([("cpu", cpu), ("memory", memory)]);
        Job::new(
            queue,
            "set-1",
            PodSpec {
                containers: vec![Container {
                    name: "container1".to_string(),
                    image: "index.docker.io/library/ubuntu:latest".to_string(),
                    args: vec!["sleep".to_string(), "10s".to_string()],
                    resources: ResourceRequirements {
                        requests: requests.clone(),
                        limits: requests,
                    },
                }],
            },
        )
    }

    /// In-memory repository with deterministic peek order and atomic lease.
    struct MockJobQueueRepository {
        jobs_by_queue: Mutex<BTreeMap<String, Vec<Job>>>,
    }

    impl MockJobQueueRepository {
        fn new(jobs_by_queue: BTreeMap<String, Vec<Job>>) -> Self {
            Self {
                jobs_by_queue: Mutex::new(jobs_by_queue),
            }
        }
    }

    #[async_trait]
    impl JobQueueRepository for MockJobQueueRepository {
        async fn peek_queue(&self, queue: &str, limit: i64) -> Result<Vec<Job>, JobQueueError> {
            let jobs = self.jobs_by_queue.lock().unwrap();
            Ok(jobs
                .get(queue)
                .map(|queued| queued.iter().take(limit as usize).cloned().collect())
                .unwrap_or_default())
        }

        async fn try_lease_jobs(
            &self,
            _cluster_id: &str,
            queue: &str,
            jobs: &[Job],
        ) -> Result<Vec<Job>, JobQueueError> {
            let mut queues = self.jobs_by_queue.lock().unwrap();
            let Some(queued) = queues.get_mut(queue) else {
                return Ok(vec![]);
            };
            let mut leased = Vec::new();
            for job in jobs {
                if let Some(index) = queued.iter().position(|candidate| candidate.id == job.id) {
                    leased.push(queued.remove(index));
                }
            }
            Ok(leased)
        }
    }

    fn request(cpu: &str, memory: &str) -> LeaseRequest {
        LeaseRequest {
            cluster_id: "c1".to_string(),
            resources: ComputeResources::from_pairs([("cpu", cpu), ("memory", memory)]),
            available_labels: vec![],
            minimum_job_size: ComputeResources::new(),
        }
    }

    fn info_with_limit(limit: ComputeResourcesFloat) -> QueueSchedulingInfo {
        QueueSchedulingInfo::new(limit)
    }

    #[test]
    fn matches_labels_against_single_node_group() {
        let job = test_job("queue1", "1", "1Mi")
            .with_required_node_labels([("armada/region", "eu"), ("armada/zone", "1")]);

        let empty = request("10", "1Gi");
        assert!(!match_requirements(&job, &empty));

        let mut split = request("10", "1Gi");
        split.available_labels = vec![
            NodeLabeling::from_pairs([("armada/region", "eu")]),
            NodeLabeling::from_pairs([("armada/zone", "2")]),
        ];
        assert!(!match_requirements(&job, &split));

        let mut wrong_zone = request("10", "1Gi");
        wrong_zone.available_labels = vec![NodeLabeling::from_pairs([
            ("armada/region", "eu"),
            ("armada/zone", "2"),
        ])];
        assert!(!match_requirements(&job, &wrong_zone));

        let mut matching = request("10", "1Gi");
        matching.available_labels = vec![
            NodeLabeling::from_pairs([("x", "y")]),
            NodeLabeling::from_pairs([
                ("armada/region", "eu"),
                ("armada/zone", "1"),
                ("x", "y"),
            ]),
        ];
        assert!(match_requirements(&job, &matching));
    }

    #[test]
    fn slices_inverse_to_priority_and_caps_by_limit() {
        let priorities = BTreeMap::from([
            (
                "cheap".to_string(),
                QueuePriorityInfo {
                    priority: 1.0,
                    current_usage: ComputeResources::new(),
                },
            ),
            (
                "expensive".to_string(),
                QueuePriorityInfo {
                    priority: 3.0,
                    current_usage: ComputeResources::new(),
                },
            ),
        ]);
        let mut scheduling_info = BTreeMap::from([
            (
                "cheap".to_string(),
                info_with_limit(ComputeResourcesFloat(BTreeMap::from([(
                    "cpu".to_string(),
                    0.5,
                )]))),
            ),
            (
                "expensive".to_string(),
                info_with_limit(ComputeResourcesFloat::new()),
            ),
        ]);
        let to_slice = ComputeResources::from_pairs([("cpu", "4")]).as_float();

        slice_resources(&priorities, &mut scheduling_info, &to_slice);

        // inverse priorities 1 and 1/3 give a 3:1 split of 4 cpu, but the
        // cheap queue is capped at 0.5 by its remaining limit.
        assert_eq!(scheduling_info["cheap"].scheduling_share.get("cpu"), 0.5);
        assert!(
            (scheduling_info["expensive"].scheduling_share.get("cpu") - 1.0).abs() < 1e-9
        );
        assert_eq!(
            scheduling_info["cheap"].adjusted_share,
            scheduling_info["cheap"].scheduling_share
        );
    }

    // High-priority (worse) queue drains through redistribution when the
    // favored queue only holds impossible-label jobs.
    #[tokio::test]
    async fn high_priority_usage_does_not_block_others() {
        let config = SchedulingConfig {
            queue_lease_batch_size: 10,
            ..SchedulingConfig::default()
        };
        let request = request("10", "1Gi");
        let request_float = request.resources.as_float();

        let priorities = BTreeMap::from([
            (
                "queue1".to_string(),
                QueuePriorityInfo {
                    priority: 1000.0,
                    current_usage: ComputeResources::from_pairs([
                        ("cpu", "100"),
                        ("memory", "80Gi"),
                    ]),
                },
            ),
            (
                "queue2".to_string(),
                QueuePriorityInfo {
                    priority: 0.5,
                    current_usage: ComputeResources::new(),
                },
            ),
        ]);
        let mut scheduling_info = BTreeMap::from([
            (
                "queue1".to_string(),
                info_with_limit(request_float.clone()),
            ),
            (
                "queue2".to_string(),
                info_with_limit(request_float.clone()),
            ),
        ]);
        slice_resources(&priorities, &mut scheduling_info, &request_float);

        let repository = MockJobQueueRepository::new(BTreeMap::from([
            (
                "queue1".to_string(),
                (0..5).map(|_| test_job("queue1", "1", "1Mi")).collect(),
            ),
            (
                "queue2".to_string(),
                vec![test_job("queue2", "1", "1Mi")
                    .with_required_node_labels([("impossible", "label")])],
            ),
        ]));

        let context = LeaseContext::new(
            &config,
            &repository,
            &request,
            priorities,
            scheduling_info,
            None,
        );
        let (jobs, _) = context.schedule_jobs().await;
        assert_eq!(jobs.len(), 5);
        assert!(jobs.iter().all(|job| job.queue == "queue1"));
    }

    // A queue never receives more than its remaining scheduling limit.
    #[tokio::test]
    async fn does_not_exceed_scheduling_limits() {
        let config = SchedulingConfig {
            queue_lease_batch_size: 10,
            ..SchedulingConfig::default()
        };
        let request = request("10", "1Gi");
        let limit = ComputeResources::from_pairs([("cpu", "2.5"), ("memory", "2.5Gi")]).as_float();

        let priorities = BTreeMap::from([(
            "queue1".to_string(),
            QueuePriorityInfo {
                priority: 1000.0,
                current_usage: ComputeResources::from_pairs([("cpu", "100"), ("memory", "80Gi")]),
            },
        )]);
        let mut scheduling_info =
            BTreeMap::from([("queue1".to_string(), info_with_limit(limit))]);
        slice_resources(&priorities, &mut scheduling_info, &request.resources.as_float());

        let repository = MockJobQueueRepository::new(BTreeMap::from([(
            "queue1".to_string(),
            (0..5).map(|_| test_job("queue1", "1", "1Mi")).collect(),
        )]));

        let context = LeaseContext::new(
            &config,
            &repository,
            &request,
            priorities,
            scheduling_info,
            None,
        );
        let (jobs, outcome) = context.schedule_jobs().await;
        assert_eq!(jobs.len(), 2);
        assert_eq!(outcome, LeaseOutcome::NoProgress);
    }
}
