use std::rc::Rc;
use std::time::SystemTime;

use gtk4 as gtk;
use gtk4::gio;
use gtk4::prelude::*;
use tracing::{debug, error, warn};

use crate::render;
use crate::shell::SketchSection;
use crate::sketch::{self, Point, Rgb, Tool};

const PALETTE: [&str; 5] = ["#000000", "#ffffff", "#e02020", "#6dd400", "#4a98f7"];

/// Drawing page: tool bar on top, canvas below. All state lives in the
/// section's [`crate::sketch::SketchPad`].
pub fn build_sketch_view(section: &Rc<SketchSection>) -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
    root.set_margin_top(12);
    root.set_margin_bottom(12);
    root.set_margin_start(12);
    root.set_margin_end(12);

    let area = gtk::DrawingArea::builder().hexpand(true).vexpand(true).build();
    area.add_css_class("folio-canvas");

    let tools = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    let mut group: Option<gtk::ToggleButton> = None;
    for tool in Tool::ALL {
        let button = gtk::ToggleButton::with_label(tool.name());
        if let Some(leader) = &group {
            button.set_group(Some(leader));
        } else {
            button.set_active(true);
            group = Some(button.clone());
        }
        let section = section.clone();
        button.connect_toggled(move |b| {
            if b.is_active() {
                section.pad().borrow_mut().tool = tool;
            }
        });
        tools.append(&button);
    }

    let fill = gtk::CheckButton::with_label("Fill");
    fill.connect_toggled({
        let section = section.clone();
        move |c| section.pad().borrow_mut().fill = c.is_active()
    });
    tools.append(&fill);

    let size = gtk::SpinButton::with_range(1.0, 30.0, 1.0);
    size.set_value(section.pad().borrow().brush_width);
    size.connect_value_changed({
        let section = section.clone();
        move |s| section.pad().borrow_mut().brush_width = s.value()
    });
    tools.append(&size);

    for hex in PALETTE {
        let Some(color) = Rgb::parse_hex(hex) else {
            continue;
        };
        let swatch = gtk::Button::with_label("●");
        swatch.set_tooltip_text(Some(hex));
        let section = section.clone();
        swatch.connect_clicked(move |_| section.pad().borrow_mut().color = color);
        tools.append(&swatch);
    }

    let picker = gtk::ColorDialogButton::new(Some(gtk::ColorDialog::new()));
    picker.set_tooltip_text(Some("Custom Colour"));
    picker.connect_rgba_notify({
        let section = section.clone();
        move |button| {
            let rgba = button.rgba();
            let color = Rgb::from_unit(rgba.red().into(), rgba.green().into(), rgba.blue().into());
            section.pad().borrow_mut().color = color;
        }
    });
    tools.append(&picker);

    let clear = gtk::Button::with_label("Clear");
    clear.connect_clicked({
        let section = section.clone();
        let area = area.clone();
        move |_| {
            section.pad().borrow_mut().clear();
            area.queue_draw();
        }
    });
    tools.append(&clear);

    let save = gtk::Button::with_label("Save Image");
    save.connect_clicked({
        let section = section.clone();
        move |button| save_drawing(button, &section)
    });
    tools.append(&save);

    area.set_draw_func({
        let section = section.clone();
        move |_, cr, _width, _height| {
            if let Err(err) = render::paint_pad(cr, &section.pad().borrow()) {
                warn!(error = %err, "canvas redraw failed");
            }
        }
    });

    area.connect_resize({
        let section = section.clone();
        move |_, width, height| {
            if width > 0 && height > 0 {
                section.set_size(width as u32, height as u32);
            }
        }
    });

    let drag = gtk::GestureDrag::new();
    drag.connect_drag_begin({
        let section = section.clone();
        move |_, x, y| section.pad().borrow_mut().begin(Point::new(x, y))
    });
    drag.connect_drag_update({
        let section = section.clone();
        let area = area.clone();
        move |gesture, dx, dy| {
            if let Some((sx, sy)) = gesture.start_point() {
                section.pad().borrow_mut().extend(Point::new(sx + dx, sy + dy));
                area.queue_draw();
            }
        }
    });
    drag.connect_drag_end({
        let section = section.clone();
        let area = area.clone();
        move |_, _, _| {
            section.pad().borrow_mut().finish();
            area.queue_draw();
        }
    });
    area.add_controller(drag);

    root.append(&tools);
    root.append(&area);
    root
}

fn save_drawing(button: &gtk::Button, section: &Rc<SketchSection>) {
    let dialog = gtk::FileDialog::builder()
        .title("Save Drawing")
        .initial_name(sketch::export_file_name(SystemTime::now()))
        .modal(true)
        .build();
    let parent = button.root().and_downcast::<gtk::Window>();
    let section = section.clone();
    dialog.save(parent.as_ref(), gio::Cancellable::NONE, move |result| {
        let file = match result {
            Ok(file) => file,
            Err(err) => {
                debug!(error = %err, "save dialog dismissed");
                return;
            }
        };
        let Some(path) = file.path() else {
            warn!("save target has no local path");
            return;
        };
        if let Err(err) = render::export_png(&section.pad().borrow(), &path) {
            error!(error = %err, "could not save drawing");
        }
    });
}
