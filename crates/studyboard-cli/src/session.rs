//! One CLI invocation's view of the tracker: load, mutate, flush.

use studyboard_core::{Clock, Config, Event, FileGateway, Subject, SubjectId, Tracker};

pub struct Session {
    pub config: Config,
    pub tracker: Tracker,
    gateway: FileGateway,
}

impl Session {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let gateway = FileGateway::in_data_dir(&config.storage.file_name)?;
        let tracker = Tracker::open(&gateway, Clock::system());
        Ok(Self {
            config,
            tracker,
            gateway,
        })
    }

    /// Write whatever is pending, immediate or deferred. A CLI process ends
    /// right after its command, so there is nothing to debounce against.
    pub fn save(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.tracker.save_to(&self.gateway)?;
        Ok(())
    }

    /// Flush and hand back the events of this invocation.
    pub fn finish(mut self) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
        self.save()?;
        Ok(self.tracker.drain_events())
    }

    pub fn subject(&self, id: &SubjectId) -> Result<&Subject, Box<dyn std::error::Error>> {
        self.tracker
            .find(id)
            .ok_or_else(|| format!("subject not found: {id}").into())
    }
}

/// Print events as pretty JSON, one document each.
pub fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}
