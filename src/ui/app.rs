use std::cell::RefCell;
use std::rc::Rc;

use adw::prelude::*;
use gio::SimpleAction;
use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use tracing::{error, info};

use super::board::Board;
use super::canvas::build_sketch_view;
use crate::game::{Clock, GameConfig, GlibClock};
use crate::shell::catalog::{DRAWING_SECTION, GAME_SECTION, PROFILE_SECTION};
use crate::shell::theme::{self, Theme};
use crate::shell::{Activation, Portfolio, ThemeController};

const APP_ID: &str = "io.folio.Portfolio";
const SIDEBAR_BREAKPOINT_SP: f64 = 768.0;

const CSS: &str = "
.folio-sidebar { padding: 12px; }
.folio-card { font-size: 28px; border-radius: 12px; }
.folio-card.active { background: alpha(@accent_bg_color, 0.35); }
.folio-card.matched { background: alpha(@success_bg_color, 0.35); }
.folio-card.mismatch-shake { background: alpha(@error_bg_color, 0.45); }
.folio-canvas { border-radius: 8px; }
";

struct Shell {
    portfolio: Rc<Portfolio>,
    stack: gtk::Stack,
    nav: gtk::ListBox,
    theme_button: gtk::Button,
    themes: RefCell<ThemeController>,
}

impl Shell {
    fn navigate(self: &Rc<Self>, id: String) {
        let shell = self.clone();
        glib::MainContext::default().spawn_local(async move {
            let outcome = shell.portfolio.open(&id).await;
            shell.show(&id, outcome);
        });
    }

    fn search(self: &Rc<Self>, query: String) {
        let shell = self.clone();
        glib::MainContext::default().spawn_local(async move {
            let Some(id) = shell.portfolio.catalog.resolve(&query).map(str::to_string) else {
                info!(query = %query, "search matched nothing");
                return;
            };
            let outcome = shell.portfolio.open(&id).await;
            shell.show(&id, outcome);
        });
    }

    fn show(&self, id: &str, outcome: Activation) {
        match outcome {
            Activation::Unknown | Activation::InFlight => {}
            _ => {
                self.stack.set_visible_child_name(id);
                let index = self
                    .portfolio
                    .catalog
                    .entries()
                    .iter()
                    .position(|entry| entry.id == id);
                if let Some(row) = index.and_then(|i| self.nav.row_at_index(i as i32)) {
                    self.nav.select_row(Some(&row));
                }
            }
        }
    }

    fn apply_theme(&self, theme: Theme) {
        let scheme = if theme.is_dark() {
            adw::ColorScheme::ForceDark
        } else {
            adw::ColorScheme::ForceLight
        };
        adw::StyleManager::default().set_color_scheme(scheme);
        self.theme_button.set_icon_name(theme.toggle_icon());
    }
}

pub fn run() -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();
    app.connect_activate(build_window);
    app.run()
}

fn load_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };
    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}

fn build_profile_view() -> gtk::Box {
    let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
    root.set_halign(gtk::Align::Center);
    root.set_valign(gtk::Align::Center);

    let title = gtk::Label::new(None);
    title.set_markup("<span size='xx-large'><b>Hello!</b></span>");
    let blurb = gtk::Label::new(Some(
        "Pick a section on the left, or search for one by name.",
    ));
    blurb.set_wrap(true);
    blurb.add_css_class("dim-label");

    root.append(&title);
    root.append(&blurb);
    root
}

fn build_window(app: &adw::Application) {
    load_css();

    let clock: Rc<dyn Clock> = Rc::new(GlibClock);
    let portfolio = match Portfolio::build(GameConfig::default(), clock) {
        Ok(portfolio) => Rc::new(portfolio),
        Err(err) => {
            error!(error = %err, "failed to assemble sections");
            app.quit();
            return;
        }
    };

    let style_manager = adw::StyleManager::default();
    let themes = ThemeController::load(theme::default_path(), style_manager.is_dark());

    let stack = gtk::Stack::new();
    stack.set_hexpand(true);
    stack.set_vexpand(true);
    stack.set_transition_type(gtk::StackTransitionType::Crossfade);
    stack.set_transition_duration(200);

    let board = Board::new(&portfolio.game);
    portfolio.game.subscribe({
        let board = Rc::downgrade(&board);
        move |event| {
            if let Some(board) = board.upgrade() {
                board.apply(event);
            }
        }
    });

    stack.add_named(&build_profile_view(), Some(PROFILE_SECTION));
    stack.add_named(&build_sketch_view(&portfolio.sketch), Some(DRAWING_SECTION));
    stack.add_named(board.widget(), Some(GAME_SECTION));

    let nav = gtk::ListBox::new();
    nav.set_selection_mode(gtk::SelectionMode::Single);
    nav.add_css_class("navigation-sidebar");
    for entry in portfolio.catalog.entries() {
        let label = gtk::Label::builder()
            .label(entry.title.as_str())
            .halign(gtk::Align::Start)
            .build();
        nav.append(&label);
    }

    let search = gtk::SearchEntry::new();
    search.set_placeholder_text(Some("Find a section"));

    let sidebar = gtk::Box::new(gtk::Orientation::Vertical, 6);
    sidebar.add_css_class("folio-sidebar");
    sidebar.set_width_request(200);
    sidebar.append(&search);
    sidebar.append(&nav);

    let split_view = adw::OverlaySplitView::new();
    split_view.set_sidebar(Some(&sidebar));
    split_view.set_content(Some(&stack));

    let sidebar_button = gtk::ToggleButton::builder()
        .icon_name("sidebar-show-symbolic")
        .build();
    sidebar_button.set_tooltip_text(Some("Toggle Sidebar"));
    split_view
        .bind_property("show-sidebar", &sidebar_button, "active")
        .bidirectional()
        .sync_create()
        .build();

    let theme_button = gtk::Button::builder()
        .icon_name(themes.current().toggle_icon())
        .build();
    theme_button.set_tooltip_text(Some("Toggle Theme"));

    let shell = Rc::new(Shell {
        portfolio: portfolio.clone(),
        stack: stack.clone(),
        nav: nav.clone(),
        theme_button: theme_button.clone(),
        themes: RefCell::new(themes),
    });
    shell.apply_theme(shell.themes.borrow().current());

    nav.connect_row_activated({
        let shell = shell.clone();
        move |_, row| {
            let index = row.index();
            let id = usize::try_from(index)
                .ok()
                .and_then(|i| shell.portfolio.catalog.entries().get(i))
                .map(|entry| entry.id.clone());
            if let Some(id) = id {
                shell.navigate(id);
            }
        }
    });

    search.connect_activate({
        let shell = shell.clone();
        move |entry| shell.search(entry.text().to_string())
    });

    theme_button.connect_clicked({
        let shell = shell.clone();
        move |_| {
            let theme = shell.themes.borrow_mut().toggle();
            shell.apply_theme(theme);
        }
    });

    let restart_button = gtk::Button::builder()
        .icon_name("view-refresh-symbolic")
        .build();
    restart_button.set_tooltip_text(Some("New Game"));
    restart_button.connect_clicked({
        let portfolio = portfolio.clone();
        move |_| {
            if let Some(game) = portfolio.game.game() {
                if let Err(err) = game.new_game(game.pair_count()) {
                    error!(error = %err, "could not deal a new game");
                }
            }
        }
    });

    let header = adw::HeaderBar::new();
    header.add_css_class("flat");
    header.pack_start(&sidebar_button);
    let end_box = gtk::Box::new(gtk::Orientation::Horizontal, 6);
    end_box.append(&restart_button);
    end_box.append(&theme_button);
    header.pack_end(&end_box);

    let quit_action = SimpleAction::new("quit", None);
    quit_action.connect_activate({
        let app = app.clone();
        move |_, _| app.quit()
    });
    app.add_action(&quit_action);
    app.set_accels_for_action("app.quit", &["<Control>q"]);

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.set_content(Some(&split_view));

    let win = adw::ApplicationWindow::builder()
        .application(app)
        .title("Folio")
        .default_width(960)
        .default_height(640)
        .content(&toolbar)
        .build();
    win.set_size_request(360, 420);

    let narrow = adw::Breakpoint::new(adw::BreakpointCondition::new_length(
        adw::BreakpointConditionLengthType::MaxWidth,
        SIDEBAR_BREAKPOINT_SP,
        adw::LengthUnit::Sp,
    ));
    narrow.add_setter(&split_view, "collapsed", Some(&true.to_value()));
    win.add_breakpoint(narrow);

    glib::MainContext::default().spawn_local({
        let shell = shell.clone();
        async move {
            let outcome = shell.portfolio.start().await;
            if let Some(id) = shell.portfolio.catalog.default_section() {
                shell.show(id, outcome);
            }
        }
    });

    win.present();
}
