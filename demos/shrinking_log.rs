// Example: a log view fed through a stream, trimmed while scrolled to the bottom.
use std::rc::Rc;

use virtual_scroll::{
    FixedSizeConfig, FixedSizeVirtualScrollStrategy, ItemContext, Orientation, PhysicalEdge,
    ScrollToOptions, ScrollableElement, Subject, ViewExtent, ViewHost, ViewportOptions,
    VirtualForOf, VirtualScrollViewport,
};

#[derive(Default)]
struct Terminal {
    scroll_top: f64,
}

impl ScrollableElement for Terminal {
    fn measure_scroll_offset(&self, edge: PhysicalEdge) -> f64 {
        if edge == PhysicalEdge::Top {
            self.scroll_top
        } else {
            0.0
        }
    }

    fn measure_viewport_size(&self, _orientation: Orientation) -> f64 {
        500.0
    }

    fn measure_rendered_content_size(&self, _orientation: Orientation) -> f64 {
        0.0
    }

    fn scroll_to(&mut self, options: ScrollToOptions) {
        if let Some(top) = options.top {
            self.scroll_top = top;
        }
    }

    fn apply_content_transform(&mut self, _transform: &str) {}

    fn apply_spacer_size(&mut self, _width: Option<f64>, _height: Option<f64>) {}
}

/// Log lines keyed by sequence number, so trimming reuses the views of surviving lines.
#[derive(Clone, Debug, PartialEq)]
struct Line {
    seq: u64,
    text: String,
}

#[derive(Default)]
struct Lines;

impl ViewHost<Line> for Lines {
    type View = (u64, usize);

    fn create_view(&mut self, context: &ItemContext<Line>) -> Self::View {
        (context.item.seq, context.index)
    }

    fn update_view(&mut self, view: &mut Self::View, context: &ItemContext<Line>) {
        *view = (context.item.seq, context.index);
    }

    fn destroy_view(&mut self, _view: Self::View) {}

    fn measure_view(&self, view: &Self::View, _orientation: Orientation) -> Option<ViewExtent> {
        let start = view.1 as f64 * 50.0;
        Some(ViewExtent::new(start, start + 50.0))
    }
}

fn lines(range: std::ops::Range<u64>) -> Rc<[Line]> {
    range
        .map(|seq| Line {
            seq,
            text: format!("event {seq}"),
        })
        .collect()
}

fn main() -> virtual_scroll::Result<()> {
    let strategy = FixedSizeVirtualScrollStrategy::new(FixedSizeConfig::new(50.0, 100.0, 200.0))?;
    let mut viewport =
        VirtualScrollViewport::new(ViewportOptions::new(strategy), Terminal::default())?;

    let log: Subject<Rc<[Line]>> = Subject::replay_latest();
    log.next(lines(0..1000));

    let mut view = VirtualForOf::with_track_by(Lines, &mut viewport, |_, line: &Line| line.seq)?;
    view.set_data(log.clone());
    let _index = viewport
        .scrolled_index_change()
        .subscribe(|index: &usize| println!("first visible line: {index}"));

    viewport.init();
    viewport.run_animation_frame();

    // Follow the tail.
    viewport.element_mut().scroll_top = 49_500.0;
    viewport.handle_scroll_event();
    viewport.run_animation_frame();
    println!("tail: range={:?}", viewport.rendered_range());

    // Retention drops everything but the first 50 lines.
    log.next(lines(0..50));
    viewport.run_microtasks();
    println!(
        "trimmed: range={:?} total={} last={:?}",
        viewport.rendered_range(),
        viewport.total_content_size(),
        view.contexts().last().map(|c| (c.index, c.item.text.clone(), c.last)),
    );
    Ok(())
}
