#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::{Rc, Weak};

    use web_time::Duration;

    use crate::*;

    struct Owner {
        holder: ObservableHolder,
        dropped: Rc<Cell<bool>>,
    }

    impl Drop for Owner {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    fn owner() -> (Rc<Owner>, Rc<Cell<bool>>) {
        let dropped = Rc::new(Cell::new(false));
        let o = Rc::new(Owner {
            holder: ObservableHolder::new(),
            dropped: dropped.clone(),
        });
        (o, dropped)
    }

    #[test]
    fn weak_capture_in_holder_allows_drop() {
        let (o, dropped) = owner();
        let weak = WeakRef::new(&o);
        o.holder.set_primary(move || {
            let _ = weak.upgrade();
        });

        drop(o);
        assert!(dropped.get());
    }

    #[test]
    fn owning_capture_in_holder_forms_cycle() {
        let (o, dropped) = owner();
        let strong = OwningRef::new(&o);
        o.holder.set_primary(move || {
            let _ = &strong;
        });
        let watch: Weak<Owner> = Rc::downgrade(&o);

        drop(o);
        assert!(!dropped.get());

        // breaking the cycle by hand releases it
        let o = watch.upgrade().unwrap();
        o.holder.clear();
        drop(o);
        assert!(dropped.get());
    }

    #[test]
    fn deferred_task_with_owning_capture_extends_lifetime() {
        let clock = ManualClock::new();
        let rl = RunLoop::new(Rc::new(clock.clone()));
        let (o, dropped) = owner();
        let strong = OwningRef::new(&o);
        rl.post_after(Duration::from_secs(2), "hold", move || {
            let _ = &strong;
        });

        drop(o);
        assert!(!dropped.get());
        clock.advance(Duration::from_secs(2));
        rl.run_due().unwrap();
        assert!(dropped.get());
    }
}
