use atmega128_scheduler::hal::{AnalogSampler, DigitalInputs, NoAnalog, TickSource};
use atmega128_scheduler::os::SystemClock;
use atmega128_scheduler::testing::{SimAdc, SimPins};
use atmega128_scheduler::{Edge, ScheduleError, Scheduler};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// What the two timer interrupts do once per millisecond
fn run<C, D, A, const N: usize>(clock: &SystemClock, sched: &Scheduler<C, D, A, N>, ticks: u32)
where
    C: TickSource,
    D: DigitalInputs,
    A: AnalogSampler,
{
    for _ in 0..ticks {
        clock.tick();
        sched.on_tick();
    }
}

#[test]
fn pin_scenario_reports_one_rise_and_one_fall() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);

    sched.arm(6, true, 1).unwrap();
    assert!(!sched.pin_level(6));

    pins.set(6, true);
    run(&clock, &sched, 20);
    assert!(sched.pin_rose(6));
    assert!(!sched.pin_rose(6));
    assert!(sched.pin_level(6));

    pins.set(6, false);
    run(&clock, &sched, 20);
    assert!(sched.pin_fell(6));
    assert!(!sched.pin_fell(6));
    assert!(!sched.pin_level(6));

    assert_eq!(sched.event_count(6, Edge::Rising, true), 1);
    assert_eq!(sched.event_count(6, Edge::Rising, false), 0);
    assert_eq!(sched.event_count(6, Edge::Falling, false), 1);
}

#[test]
fn pin_rose_is_edge_triggered() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(3, true, 1).unwrap();

    pins.set(3, true);
    run(&clock, &sched, 15);
    assert!(!sched.pin_level(3));
    assert!(!sched.pin_rose(3));

    run(&clock, &sched, 1);
    assert!(sched.pin_level(3));
    assert!(sched.pin_rose(3));
    assert!(!sched.pin_rose(3));
    assert!(sched.pin_level(3));

    // Staying HIGH never re-triggers
    run(&clock, &sched, 100);
    assert!(!sched.pin_rose(3));
}

#[test]
fn pin_level_leaves_change_pending() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(1, true, 1).unwrap();

    pins.set(1, true);
    run(&clock, &sched, 20);
    assert!(sched.pin_level(1));
    assert!(sched.pin_level(1));
    assert!(sched.pin_rose(1));
}

#[test]
fn glitches_shorter_than_threshold_are_filtered() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(4, true, 1).unwrap();

    for _ in 0..10 {
        pins.set(4, true);
        run(&clock, &sched, 3);
        pins.set(4, false);
        run(&clock, &sched, 3);
    }
    assert!(!sched.pin_rose(4));
    assert_eq!(sched.event_count(4, Edge::Rising, false), 0);
}

#[test]
fn cancel_is_idempotent() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);

    sched.arm(6, true, 1).unwrap();
    pins.set(6, true);
    run(&clock, &sched, 20);
    assert!(sched.pin_level(6));

    for _ in 0..5 {
        sched.cancel(6).unwrap();
    }

    pins.set(6, false);
    run(&clock, &sched, 50);
    assert!(sched.pin_level(6));
    assert_eq!(sched.event_count(6, Edge::Rising, false), 1);
    assert_eq!(sched.event_count(6, Edge::Falling, false), 0);
    assert!(!sched.poll(6));
    assert!(!sched.pin_fell(6));

    sched.arm(70, false, 5).unwrap();
    sched.cancel(70).unwrap();
    sched.cancel(70).unwrap();
    for _ in 0..100 {
        run(&clock, &sched, 1);
        assert!(!sched.poll(70));
    }

    // Rearming brings the slot back
    sched.arm(70, false, 5).unwrap();
    run(&clock, &sched, 5);
    assert!(sched.poll(70));
}

#[test]
fn unknown_ids_read_as_no_event() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);

    pins.set(5, true);
    run(&clock, &sched, 30);

    assert!(!sched.poll(5));
    assert!(!sched.pin_rose(5));
    assert!(!sched.pin_fell(5));
    assert!(!sched.pin_level(5));
    assert_eq!(sched.event_count(5, Edge::Rising, true), 0);
    assert_eq!(sched.cancel(5), Err(ScheduleError::UnknownId));
}

#[test]
fn full_table_rejects_only_new_ids() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);

    for id in 0..sched.capacity() as i8 {
        sched.arm(40 + id, false, 10).unwrap();
    }
    assert_eq!(sched.arm(100, false, 10), Err(ScheduleError::TableFull));
    assert!(sched.arm(40, true, 10).is_ok());

    run(&clock, &sched, 10);
    assert!(sched.poll(40));
    assert!(!sched.poll(100));
}

#[test]
fn recurring_pin_slot_keeps_cadence_while_ticking() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(7, true, 1000).unwrap();

    let mut fired = Vec::new();
    for _ in 0..3500 {
        run(&clock, &sched, 1);
        if sched.poll(7) {
            fired.push(clock.millis());
        }
    }
    assert_eq!(fired, [1000, 2000, 3000]);
}

#[test]
fn pin_slot_expiries_wait_for_a_late_poll() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(7, true, 100).unwrap();
    sched.arm(8, false, 50).unwrap();

    run(&clock, &sched, 350);
    assert!(sched.poll(7));
    assert!(sched.poll(7));
    assert!(sched.poll(7));
    assert!(!sched.poll(7));

    assert!(sched.poll(8));
    assert!(!sched.poll(8));

    // Cancelling drops whatever the tick had queued
    run(&clock, &sched, 100);
    sched.cancel(7).unwrap();
    assert!(!sched.poll(7));
}

#[test]
fn long_period_timer_does_not_fire_early() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(100, false, 0x9000_0000).unwrap();

    run(&clock, &sched, 1);
    assert!(!sched.poll(100));

    clock.advance(0x9000_0000 - 2);
    assert!(!sched.poll(100));
    clock.advance(1);
    assert!(sched.poll(100));
}

#[test]
fn timer_armed_just_before_counter_wrap() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    clock.advance(u32::MAX - 4);
    sched.arm(100, false, 10).unwrap();

    run(&clock, &sched, 9);
    assert!(!sched.poll(100));
    run(&clock, &sched, 1);
    assert!(sched.poll(100));
}

#[test]
fn recurring_timer_fires_every_period() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(70, true, 1000).unwrap();

    let mut fired = Vec::new();
    for _ in 0..3500 {
        run(&clock, &sched, 1);
        if sched.poll(70) {
            fired.push(clock.millis());
        }
    }
    assert_eq!(fired.len(), 3);
    assert!(fired.windows(2).all(|w| w[1] - w[0] >= 1000));
}

#[test]
fn late_poll_catches_up_without_drift() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(80, true, 100).unwrap();

    run(&clock, &sched, 350);
    assert!(sched.poll(80));
    assert!(sched.poll(80));
    assert!(sched.poll(80));
    assert!(!sched.poll(80));

    run(&clock, &sched, 50);
    assert!(sched.poll(80));
}

#[test]
fn zero_period_watch_tracks_input_every_tick() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    sched.arm(9, true, 0).unwrap();

    let pattern = [true, true, false, true, false, false, true];
    let mut rises = 0;
    for &level in &pattern {
        pins.set(9, level);
        run(&clock, &sched, 1);
        assert_eq!(sched.pin_level(9), level);

        if sched.pin_rose(9) {
            rises += 1;
        }
        assert!(!sched.pin_rose(9));
    }

    assert_eq!(rises, 3);
    assert_eq!(sched.event_count(9, Edge::Rising, false), 3);
    assert_eq!(sched.event_count(9, Edge::Falling, false), 2);
}

#[test]
fn zero_length_one_shot_is_registered_idle() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);

    sched.arm(90, false, 0).unwrap();
    run(&clock, &sched, 10);
    assert!(!sched.poll(90));
    assert!(sched.cancel(90).is_ok());
}

#[test]
fn analog_samples_are_at_most_channel_count_ticks_old() {
    const CHANNELS: u8 = 3;
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let adc = SimAdc::new();
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, &adc);
    sched.init(CHANNELS);

    run(&clock, &sched, 10);

    // Change the input at every phase of the rotation
    for (round, value) in (500..520u16).enumerate() {
        let channel = (round % CHANNELS as usize) as u8;
        adc.set(channel, value);

        let mut age = None;
        for tick in 1..=CHANNELS as u32 {
            run(&clock, &sched, 1);
            if sched.analog_read(channel) == value {
                age = Some(tick);
                break;
            }
        }
        assert!(age.is_some(), "channel {channel} never showed {value}");
    }
}

#[test]
fn analog_read_outside_scan_is_zero() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let adc = SimAdc::new();
    for channel in 0..8 {
        adc.set(channel, 700);
    }
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, &adc);
    sched.init(2);

    run(&clock, &sched, 10);
    assert_eq!(sched.analog_read(0), 700);
    assert_eq!(sched.analog_read(1), 700);
    assert_eq!(sched.analog_read(2), 0);
    assert_eq!(sched.analog_read(200), 0);
}

#[test]
fn busy_adc_does_not_stall_debounce() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let adc = SimAdc::new();
    adc.set(0, 321);
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, &adc);
    sched.init(1);
    sched.arm(2, true, 1).unwrap();

    adc.set_busy(true);
    pins.set(2, true);
    run(&clock, &sched, 20);
    assert!(sched.pin_rose(2));
    assert_eq!(sched.analog_read(0), 0);
    assert_eq!(adc.conversions_started(), 1);

    adc.set_busy(false);
    run(&clock, &sched, 1);
    assert_eq!(sched.analog_read(0), 321);
}

#[test]
fn channel_count_is_clamped() {
    let clock = SystemClock::new();
    let pins = SimPins::new();
    let adc = SimAdc::new();
    adc.set(7, 42);
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, &adc);
    sched.init(200);

    run(&clock, &sched, 20);
    assert_eq!(sched.analog_read(7), 42);
    assert_eq!(sched.analog_read(8), 0);
}

/// Pin bank the tick thread and the test thread can share
struct SharedPins(AtomicU32);

impl DigitalInputs for SharedPins {
    fn is_high(&self, pin: u8) -> bool {
        self.0.load(Ordering::SeqCst) & (1 << pin) != 0
    }
}

#[test]
fn resetting_counts_while_ticking_loses_no_edges() {
    const TICKS: u32 = 20_000;
    let clock = SystemClock::new();
    let pins = SharedPins(AtomicU32::new(0));
    let sched: Scheduler<_, _, _> = Scheduler::new(&clock, &pins, NoAnalog);
    sched.init(0);
    // Zero period: one confirmed edge per input change
    sched.arm(5, true, 0).unwrap();

    let done = AtomicBool::new(false);
    let mut total = 0u32;

    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..TICKS {
                pins.0.store(if i % 2 == 0 { 1 << 5 } else { 0 }, Ordering::SeqCst);
                clock.tick();
                sched.on_tick();
            }
            done.store(true, Ordering::SeqCst);
        });

        while !done.load(Ordering::SeqCst) {
            total += u32::from(sched.event_count(5, Edge::Rising, true));
        }
    });
    total += u32::from(sched.event_count(5, Edge::Rising, true));

    assert_eq!(total, TICKS / 2);
}
