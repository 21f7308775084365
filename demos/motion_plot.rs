use std::error::Error;

use drag2d_motion::{Easing, FrameSampler, Limits, MotionProfile2d};
use gnuplot::*;

fn main() -> Result<(), Box<dyn Error>> {
    // -----------------------
    // 1. Set up parameters
    // -----------------------
    // A fling released at (0, 0) heading for (50, 20), still carrying
    // some velocity from the drag gesture.
    let start = (0.0, 0.0);
    let end = (50.0, 20.0);
    let release_velocity = (12.0, -4.0);

    // Motion ceilings
    let limits = Limits::new(
        20.0, // maximum velocity
        40.0, // maximum acceleration
        5.0,  // maximum duration (seconds)
    )?;

    // -------------------------
    // 2. Solve and synchronize
    // -------------------------
    let profile = MotionProfile2d::configure(start, end, release_velocity, limits)?
        .with_easing(Easing::decelerate())?;

    let total_time = profile.duration();
    if total_time <= 0.0 {
        return Err("nothing to animate: start and end coincide".into());
    }
    println!(
        "Dominant axis: {:?}, duration: {:.3}s, stages per axis: {}",
        profile.dominant_axis(),
        total_time,
        profile.stage_count()
    );

    // -------------------------
    // 3. Sample frame by frame
    // -------------------------
    let sampling_rate = 240u16;
    let mut sampler = FrameSampler::new(profile, sampling_rate);

    let capacity = (f64::from(sampling_rate) * total_time).ceil() as usize + 1;
    let mut time_axis = Vec::with_capacity(capacity);
    let mut xs = Vec::with_capacity(capacity);
    let mut ys = Vec::with_capacity(capacity);
    let mut vxs = Vec::with_capacity(capacity);
    let mut vys = Vec::with_capacity(capacity);

    loop {
        let (x, y) = sampler.position();
        let (vx, vy) = sampler.velocity();
        time_axis.push(sampler.elapsed());
        xs.push(x);
        ys.push(y);
        vxs.push(vx);
        vys.push(vy);
        if sampler.is_done() {
            break;
        }
        sampler.tick();
    }

    // Quick final check (did we roughly reach the target?)
    let final_x = *xs.last().unwrap_or(&0.0);
    let final_y = *ys.last().unwrap_or(&0.0);
    if (final_x - end.0).abs() > 0.01 || (final_y - end.1).abs() > 0.01 {
        eprintln!("Warning: final position is off by more than 0.01 units.");
    }

    // --------------
    // 4. Plot data
    // --------------
    let mut fg = Figure::new();
    {
        let axes = fg.axes2d();
        axes.set_title("Position and velocity vs. time", &[]);
        axes.set_x_label("Time (s)", &[]);
        axes.set_y_label("Position / velocity", &[]);
        axes.lines(&time_axis, &xs, &[Color("blue"), Caption("x position")]);
        axes.lines(&time_axis, &ys, &[Color("red"), Caption("y position")]);
        axes.lines(&time_axis, &vxs, &[Color("cyan"), Caption("x velocity")]);
        axes.lines(&time_axis, &vys, &[Color("orange"), Caption("y velocity")]);
    }

    // Attempt to show in a pop-up window (requires gnuplot installed)
    fg.show().map_err(|e| format!("Failed to display plot: {e}"))?;

    println!("Plot generated. Total motion time: {:.3} seconds.", total_time);
    Ok(())
}
