use futures_util::{stream, Stream};
use grid_core::RowError;

use crate::engine::SessionEngine;
use crate::events::StreamEvent;
use crate::source::InputSource;

/// Lazily steps `engine` over `source`, one event per pull.
///
/// Ends when the source is exhausted or right after the first row error.
/// Consumers cancel by dropping the stream, which also drops the source.
pub fn event_stream<S>(
    source: S,
    engine: SessionEngine,
) -> impl Stream<Item = Result<StreamEvent, RowError>> + Send
where
    S: InputSource + Send + 'static,
{
    stream::unfold(Some((engine, source)), |slot| async move {
        let (mut engine, mut source) = slot?;
        match source.next_input().await? {
            Ok(input) => {
                let event = engine.apply(input);
                Some((Ok(event), Some((engine, source))))
            }
            Err(err) => Some((Err(err), None)),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures_util::StreamExt;
    use grid_core::{Dataset, RecordSeries, RowError};

    use super::event_stream;
    use crate::engine::SessionEngine;
    use crate::source::ReplaySource;

    fn series(csv: &str) -> RecordSeries {
        RecordSeries::from_reader(csv.as_bytes()).unwrap()
    }

    fn neutral_dataset() -> Arc<Dataset> {
        Arc::new(Dataset::from_series(
            series("timestamp,temp_c\nt0,18\nt1,18\nt2,18\n"),
            series("timestamp,spot_price,grid_load_mw\nt0,50,700\nt1,52,700\nt2,48,700\n"),
            series("timestamp,congestion_index\nt0,50\nt1,50\nt2,50\n"),
        ))
    }

    #[tokio::test]
    async fn replay_stream_emits_one_event_per_row_then_ends() {
        let events: Vec<_> = event_stream(ReplaySource::new(neutral_dataset()), SessionEngine::new())
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        let last = events[2].as_ref().unwrap();
        assert_eq!(last.tick.timestamp, "t2");
        assert_eq!(last.tick.pnl, -4.0);
        assert!(last.live.is_none());
    }

    #[tokio::test]
    async fn consumer_can_stop_after_any_event() {
        let first: Vec<_> = event_stream(ReplaySource::new(neutral_dataset()), SessionEngine::new())
            .take(1)
            .collect()
            .await;

        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn stream_ends_after_first_row_error() {
        let dataset = Arc::new(Dataset::from_series(
            series("timestamp,temp_c\nt0,18\nt1,oops\nt2,18\n"),
            series("timestamp,spot_price,grid_load_mw\nt0,50,700\nt1,52,700\nt2,48,700\n"),
            series("timestamp,congestion_index\nt0,50\nt1,50\nt2,50\n"),
        ));

        let events: Vec<_> = event_stream(ReplaySource::new(dataset), SessionEngine::new())
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(events[1], Err(RowError::InvalidNumber { field: "temp_c", .. })));
    }

    #[tokio::test]
    async fn fresh_engines_replay_identically() {
        let dataset = neutral_dataset();
        let first: Vec<_> = event_stream(ReplaySource::new(Arc::clone(&dataset)), SessionEngine::new())
            .collect()
            .await;
        let second: Vec<_> = event_stream(ReplaySource::new(dataset), SessionEngine::new())
            .collect()
            .await;

        assert_eq!(first, second);
    }
}
