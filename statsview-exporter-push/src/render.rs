use statsview::{AggregationData, Snapshot};

use crate::common::sanitize_metric_name;

/// Renders a snapshot in the text exposition format sent to the endpoint.
///
/// Scalar aggregations render as single counter/gauge lines; distributions
/// render as cumulative `_bucket` lines followed by `_sum` and `_count`.
/// Snapshots order views by name, so the rendering is deterministic.
pub fn render(snapshot: &Snapshot) -> String {
    let mut output = String::new();

    for view_data in snapshot.views() {
        let view = view_data.view();
        let name = sanitize_metric_name(view.name());

        if !view.description().is_empty() {
            write_help_line(&mut output, &name, view.description());
        }

        match view_data.data() {
            AggregationData::Count(count) => {
                write_type_line(&mut output, &name, "counter");
                write_metric_line::<&str, u64>(&mut output, &name, None, None, *count);
            }
            AggregationData::Sum(sum) => {
                write_type_line(&mut output, &name, "gauge");
                write_metric_line::<&str, f64>(&mut output, &name, None, None, *sum);
            }
            AggregationData::LastValue(last) => {
                write_type_line(&mut output, &name, "gauge");
                if let Some(value) = last {
                    write_metric_line::<&str, f64>(&mut output, &name, None, None, *value);
                }
            }
            AggregationData::Distribution(histogram) => {
                write_type_line(&mut output, &name, "histogram");
                for (le, count) in histogram.buckets() {
                    write_metric_line(&mut output, &name, Some("bucket"), Some(("le", le)), count);
                }
                write_metric_line(
                    &mut output,
                    &name,
                    Some("bucket"),
                    Some(("le", "+Inf")),
                    histogram.count(),
                );
                write_metric_line::<&str, f64>(
                    &mut output,
                    &name,
                    Some("sum"),
                    None,
                    histogram.sum(),
                );
                write_metric_line::<&str, u64>(
                    &mut output,
                    &name,
                    Some("count"),
                    None,
                    histogram.count(),
                );
            }
        }

        output.push('\n');
    }

    output
}

fn write_help_line(buffer: &mut String, name: &str, desc: &str) {
    buffer.push_str("# HELP ");
    buffer.push_str(name);
    buffer.push(' ');
    buffer.push_str(desc);
    buffer.push('\n');
}

fn write_type_line(buffer: &mut String, name: &str, metric_type: &str) {
    buffer.push_str("# TYPE ");
    buffer.push_str(name);
    buffer.push(' ');
    buffer.push_str(metric_type);
    buffer.push('\n');
}

fn write_metric_line<T, T2>(
    buffer: &mut String,
    name: &str,
    suffix: Option<&'static str>,
    label: Option<(&'static str, T)>,
    value: T2,
) where
    T: std::fmt::Display,
    T2: std::fmt::Display,
{
    buffer.push_str(name);
    if let Some(suffix) = suffix {
        buffer.push('_');
        buffer.push_str(suffix);
    }

    if let Some((label_name, label_value)) = label {
        buffer.push('{');
        buffer.push_str(label_name);
        buffer.push_str("=\"");
        buffer.push_str(label_value.to_string().as_str());
        buffer.push_str("\"}");
    }

    buffer.push(' ');
    buffer.push_str(value.to_string().as_str());
    buffer.push('\n');
}

#[cfg(test)]
mod tests {
    use statsview::{Aggregation, BucketBoundaries, Measure, Stats, Unit, View};

    use super::render;

    fn latency() -> Measure {
        Measure::new("task_latency", "The task latency in milliseconds", Unit::Milliseconds)
    }

    #[test]
    fn test_render_distribution() {
        let stats = Stats::new();
        let bounds =
            BucketBoundaries::new(&[0.0, 100.0, 200.0, 400.0, 1000.0, 2000.0, 4000.0]).unwrap();
        stats
            .register_view(View::new(
                "task_latency_distribution",
                "The distribution of the task latencies.",
                latency(),
                Aggregation::Distribution(bounds),
            ))
            .unwrap();

        let recorder = stats.recorder();
        recorder.record(&latency(), 50.0);
        recorder.record(&latency(), 150.0);
        recorder.record(&latency(), 4500.0);

        let rendered = render(&stats.snapshot());
        let expected = concat!(
            "# HELP task_latency_distribution The distribution of the task latencies.\n",
            "# TYPE task_latency_distribution histogram\n",
            "task_latency_distribution_bucket{le=\"0\"} 0\n",
            "task_latency_distribution_bucket{le=\"100\"} 1\n",
            "task_latency_distribution_bucket{le=\"200\"} 2\n",
            "task_latency_distribution_bucket{le=\"400\"} 2\n",
            "task_latency_distribution_bucket{le=\"1000\"} 2\n",
            "task_latency_distribution_bucket{le=\"2000\"} 2\n",
            "task_latency_distribution_bucket{le=\"4000\"} 2\n",
            "task_latency_distribution_bucket{le=\"+Inf\"} 3\n",
            "task_latency_distribution_sum 4700\n",
            "task_latency_distribution_count 3\n",
            "\n",
        );

        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_scalars_and_sanitization() {
        let stats = Stats::new();
        let depth = Measure::new("queue.depth", "The queue depth.", Unit::Count);
        stats
            .register_view(View::new(
                "queue.depth count",
                "",
                depth.clone(),
                Aggregation::Count,
            ))
            .unwrap();
        stats
            .register_view(View::new(
                "queue.depth last",
                "The last observed queue depth.",
                depth.clone(),
                Aggregation::LastValue,
            ))
            .unwrap();

        let recorder = stats.recorder();
        recorder.record(&depth, 3.0);
        recorder.record(&depth, 5.0);

        let rendered = render(&stats.snapshot());
        let expected = concat!(
            "# TYPE queue_depth_count counter\n",
            "queue_depth_count 2\n",
            "\n",
            "# HELP queue_depth_last The last observed queue depth.\n",
            "# TYPE queue_depth_last gauge\n",
            "queue_depth_last 5\n",
            "\n",
        );

        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_last_value_before_any_sample() {
        let stats = Stats::new();
        let depth = Measure::new("queue_depth", "The queue depth.", Unit::Count);
        stats
            .register_view(View::new(
                "queue_depth_last",
                "",
                depth,
                Aggregation::LastValue,
            ))
            .unwrap();

        let rendered = render(&stats.snapshot());
        assert_eq!(rendered, "# TYPE queue_depth_last gauge\n\n");
    }
}
