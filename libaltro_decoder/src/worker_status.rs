/// Progress report sent from a processing worker to whoever is watching it
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    pub progress: f32,
    pub event_number: i32,
    pub worker_id: usize,
}

impl WorkerStatus {
    pub fn new(progress: f32, event_number: i32, worker_id: usize) -> Self {
        Self {
            progress,
            event_number,
            worker_id,
        }
    }
}
