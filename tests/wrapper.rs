mod common;

use std::rc::Rc;

use ripplekit::drawable::{Inset, InsetValue, Passthrough, WrapperState};
use ripplekit::prelude::*;

use common::{init_logging, solid};

type Wrapped = DrawableWrapper<Passthrough>;

fn ripple_in_inset() -> InsetDrawable {
    init_logging();
    let mut ripple = RippleDrawable::new(
        ColorStateList::value_of(Color::WHITE),
        solid(Color::WHITE),
        None,
    );
    ripple.set_radius(15);
    InsetDrawable::new(
        Inset::uniform(InsetValue::pixels(7)),
        Some(Box::new(ripple)),
    )
}

fn clone_of(drawable: &dyn Drawable) -> Box<dyn Drawable> {
    drawable.constant_state().unwrap().new_drawable()
}

fn wrapper_state<K: ripplekit::drawable::WrapperKind>(
    drawable: &dyn Drawable,
) -> &Rc<WrapperState<K>> {
    drawable
        .as_any()
        .downcast_ref::<DrawableWrapper<K>>()
        .unwrap()
        .wrapper_state()
}

fn inner_ripple(drawable: &dyn Drawable) -> &RippleDrawable {
    drawable
        .as_any()
        .downcast_ref::<InsetDrawable>()
        .unwrap()
        .drawable()
        .unwrap()
        .as_any()
        .downcast_ref::<RippleDrawable>()
        .unwrap()
}

#[test]
fn test_clones_share_state_until_mutated() {
    let first = ripple_in_inset();
    let mut second = clone_of(&first);
    assert!(Rc::ptr_eq(
        first.wrapper_state(),
        wrapper_state::<Inset>(second.as_ref())
    ));

    second.mutate();
    assert!(!Rc::ptr_eq(
        first.wrapper_state(),
        wrapper_state::<Inset>(second.as_ref())
    ));
    assert!(!Rc::ptr_eq(
        inner_ripple(&first).ripple_state(),
        inner_ripple(second.as_ref()).ripple_state()
    ));
}

#[test]
fn test_alpha_and_child_swaps_stay_local() {
    init_logging();
    let mut first = Wrapped::new(Passthrough, solid(Color::WHITE));
    let mut second = clone_of(&first);

    first.set_alpha(10);
    assert_eq!(second.alpha(), 255);
    second.set_alpha(200);
    assert_eq!(first.alpha(), 10);

    first.set_drawable(solid(Color::BLACK));
    let third = clone_of(second.as_ref());
    let child = third
        .as_any()
        .downcast_ref::<Wrapped>()
        .unwrap()
        .drawable()
        .unwrap()
        .as_any()
        .downcast_ref::<ColorDrawable>()
        .unwrap();
    assert_eq!(child.color(), Color::WHITE);
}

#[test]
fn test_pressing_a_clone_leaves_the_original_idle() {
    let mut first = ripple_in_inset();
    first.set_bounds(Rect::new(0.0, 0.0, 64.0, 64.0));
    let mut second = clone_of(&first);
    second.set_bounds(Rect::new(0.0, 0.0, 64.0, 64.0));

    second.set_state(StateSet::ENABLED | StateSet::PRESSED);
    assert!(inner_ripple(second.as_ref()).is_ripple_active());
    assert!(!inner_ripple(&first).is_ripple_active());
    assert_eq!(inner_ripple(&first).radius(), 15);
    assert_eq!(inner_ripple(second.as_ref()).radius(), 15);
}

#[test]
fn test_density_round_trip_through_wrapper() {
    let mut inset = ripple_in_inset();
    inset.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));

    inset.set_density(320);
    assert_eq!(inset.insets(), [14; 4]);
    assert_eq!(inner_ripple(&inset).radius(), 30);
    assert_eq!(
        inset.drawable().unwrap().bounds(),
        Rect::from_ltrb(14.0, 14.0, 86.0, 86.0)
    );

    inset.set_density(160);
    assert_eq!(inset.insets(), [7; 4]);
    assert_eq!(inner_ripple(&inset).radius(), 15);
}

#[test]
fn test_odd_densities_round_trip_within_a_pixel() {
    for density in [120, 213, 240, 480] {
        let mut inset = ripple_in_inset();
        inset.set_density(density);
        inset.set_density(160);
        let [left, ..] = inset.kind().resolve(Rect::new(0.0, 0.0, 50.0, 50.0));
        assert!((left - 7).abs() <= 1, "{} dpi gave {}", density, left);
        assert!((inner_ripple(&inset).radius() - 15).abs() <= 1);
    }
}

#[test]
fn test_theme_reaches_wrapped_ripple() {
    init_logging();
    let mut inset = InsetDrawable::new(
        Inset::uniform(InsetValue::pixels(2)),
        Some(Box::new(RippleDrawable::themed(solid(Color::WHITE), None))),
    );
    assert!(inset.can_apply_theme());
    let theme = Theme::new().set(
        ThemeAttr::COLOR_CONTROL_HIGHLIGHT,
        ThemeValue::Color(Color::BLACK),
    );
    inset.apply_theme(&theme).unwrap();
    assert_eq!(inner_ripple(&inset).color().default_color(), Color::BLACK);

    let mut missing = InsetDrawable::new(
        Inset::uniform(InsetValue::pixels(2)),
        Some(Box::new(RippleDrawable::themed(None, None))),
    );
    assert_eq!(
        missing.apply_theme(&Theme::new()),
        Err(DrawableError::UnresolvedThemeAttribute {
            attr: ThemeAttr::COLOR_CONTROL_HIGHLIGHT
        })
    );
}
