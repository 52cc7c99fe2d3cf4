// Example: a fixed-size list of a million rows, scrolled and rendered as text.
use std::rc::Rc;

use virtual_scroll::{
    FixedSizeConfig, FixedSizeVirtualScrollStrategy, ItemContext, Orientation, PhysicalEdge,
    ScrollBehavior, ScrollToOptions, ScrollableElement, ViewExtent, ViewHost, ViewportOptions,
    VirtualForOf, VirtualScrollViewport,
};

const ROW_HEIGHT: f64 = 20.0;

/// A pretend scroll container: 400px tall, scrolled by assigning `scroll_top`.
#[derive(Default)]
struct Pane {
    scroll_top: f64,
    transform: String,
    spacer_height: f64,
}

impl ScrollableElement for Pane {
    fn measure_scroll_offset(&self, edge: PhysicalEdge) -> f64 {
        match edge {
            PhysicalEdge::Top => self.scroll_top,
            _ => 0.0,
        }
    }

    fn measure_viewport_size(&self, _orientation: Orientation) -> f64 {
        400.0
    }

    fn measure_rendered_content_size(&self, _orientation: Orientation) -> f64 {
        0.0
    }

    fn scroll_to(&mut self, options: ScrollToOptions) {
        if let Some(top) = options.top {
            self.scroll_top = top;
        }
    }

    fn apply_content_transform(&mut self, transform: &str) {
        self.transform = transform.to_owned();
    }

    fn apply_spacer_size(&mut self, _width: Option<f64>, height: Option<f64>) {
        self.spacer_height = height.unwrap_or_default();
    }
}

struct Row {
    text: String,
    index: usize,
}

#[derive(Default)]
struct Rows {
    created: usize,
}

impl ViewHost<Rc<str>> for Rows {
    type View = Row;

    fn create_view(&mut self, context: &ItemContext<Rc<str>>) -> Row {
        self.created += 1;
        Row {
            text: context.item.to_string(),
            index: context.index,
        }
    }

    fn update_view(&mut self, view: &mut Row, context: &ItemContext<Rc<str>>) {
        view.text = format!("{:>7} {}", context.index, context.item);
        view.index = context.index;
    }

    fn destroy_view(&mut self, _view: Row) {}

    fn measure_view(&self, view: &Row, _orientation: Orientation) -> Option<ViewExtent> {
        let start = view.index as f64 * ROW_HEIGHT;
        Some(ViewExtent::new(start, start + ROW_HEIGHT))
    }
}

fn print_window(
    label: &str,
    viewport: &VirtualScrollViewport<FixedSizeVirtualScrollStrategy, Pane>,
    list: &VirtualForOf<Rc<str>, Rows>,
) {
    println!(
        "{label}: range={:?} transform={} spacer={} views={} created={}",
        viewport.rendered_range(),
        viewport.element().transform,
        viewport.element().spacer_height,
        list.view_count(),
        list.with_host(|rows| rows.created),
    );
    list.with_views(|views| {
        for row in views.iter().take(3) {
            println!("  {}", row.view.text);
        }
    });
}

fn main() -> virtual_scroll::Result<()> {
    let strategy =
        FixedSizeVirtualScrollStrategy::new(FixedSizeConfig::new(ROW_HEIGHT, 100.0, 200.0))?;
    let mut viewport = VirtualScrollViewport::new(ViewportOptions::new(strategy), Pane::default())?;

    let items: Vec<Rc<str>> = (0..1_000_000)
        .map(|i| Rc::from(format!("row #{i}")))
        .collect();
    let mut list = VirtualForOf::new(Rows::default(), &mut viewport)?;
    list.set_data(items);

    viewport.init();
    viewport.run_animation_frame();
    print_window("initial", &viewport, &list);

    // A burst of scroll events is handled once per frame.
    for top in [1_000.0, 5_000.0, 123_456.0] {
        viewport.element_mut().scroll_top = top;
        viewport.handle_scroll_event();
    }
    viewport.run_animation_frame();
    print_window("scrolled", &viewport, &list);

    viewport.scroll_to_index(999_990, ScrollBehavior::Instant);
    viewport.handle_scroll_event();
    viewport.run_animation_frame();
    print_window("end", &viewport, &list);

    list.destroy();
    viewport.destroy();
    Ok(())
}
