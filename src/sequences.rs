// StrikeBox - Display & Pixel Sequences
//
// Fixed, blocking visual sequences: the power-on greeting, the 3-2-1
// countdown that precedes a session and the results attention blink. Input
// is not sampled while one of these runs.

use anyhow::Context;

use crate::config::*;
use crate::events::AccelSample;
use crate::hal::{
    Board, Clock, MotionSensor, NumericDisplay, PixelStrip, GLYPHS_ALL_ON, GLYPHS_BLANK,
    GLYPHS_GREETING, OFF, PALETTE,
};

/// Power-on self test and greeting. Returns the self-test sample.
pub fn run_greeting<S, D, P, B, C>(board: &mut Board<S, D, P, B, C>, brightness: u8) -> anyhow::Result<AccelSample>
where
    S: MotionSensor,
    D: NumericDisplay,
    P: PixelStrip,
    C: Clock,
{
    board.display.show_glyphs(GLYPHS_ALL_ON)?;
    board.clock.delay_ms(GREETING_ALL_ON_MS);
    board.display.show_glyphs(GLYPHS_BLANK)?;
    board.clock.delay_ms(GREETING_BLANK_MS);

    board.display.set_brightness(brightness)?;
    board.display.show_glyphs(GLYPHS_GREETING)?;

    for color in PALETTE {
        board.pixels.fill(color)?;
        board.clock.delay_ms(GREETING_CUE_MS);
    }
    board.pixels.fill(OFF)?;

    let sample = AccelSample::from(
        board
            .sensor
            .read_acceleration()
            .context("motion sensor self test failed")?,
    );
    log::info!("Self test |a| = {:.2} m/s²", sample.magnitude);
    Ok(sample)
}

/// 3-2-1 countdown, ending with the selected duration on the display.
pub fn run_countdown<S, D, P, B, C>(
    board: &mut Board<S, D, P, B, C>,
    style: CountdownStyle,
    duration: u16,
) -> anyhow::Result<()>
where
    D: NumericDisplay,
    P: PixelStrip,
    C: Clock,
{
    // The blink style goes straight to 3-2-1.
    if style == CountdownStyle::ColorCues {
        board.display.clear()?;
        board.clock.delay_ms(COUNTDOWN_LEAD_IN_MS);
    }

    for digit in [3u16, 2, 1] {
        board.display.show_number(digit)?;
        if style == CountdownStyle::ColorCues {
            board.pixels.fill(PALETTE[usize::from(digit) - 1])?;
        }
        board.clock.delay_ms(COUNTDOWN_STEP_MS);
    }

    match style {
        CountdownStyle::ColorCues => {
            board.display.clear()?;
            board.pixels.fill(OFF)?;
            board.clock.delay_ms(COUNTDOWN_BLANK_MS);
        }
        CountdownStyle::BlinkDuration => {
            for _ in 0..COUNTDOWN_BLINKS {
                board.display.show_number(0)?;
                board.clock.delay_ms(COUNTDOWN_BLINK_MS);
                board.display.show_number(duration)?;
                board.clock.delay_ms(COUNTDOWN_BLINK_MS);
            }
            board.display.clear()?;
            board.clock.delay_ms(COUNTDOWN_LEAD_IN_MS);
        }
    }

    board.display.show_number(duration)?;
    Ok(())
}

/// Flash the final score so it is noticed, leaving it on the display.
pub fn run_results_attention<S, D, P, B, C>(board: &mut Board<S, D, P, B, C>, strikes: u16) -> anyhow::Result<()>
where
    D: NumericDisplay,
    C: Clock,
{
    board.display.show_glyphs(GLYPHS_ALL_ON)?;
    board.clock.delay_ms(RESULTS_ALL_ON_MS);
    board.display.clear()?;
    board.clock.delay_ms(RESULTS_BLANK_MS);

    board.display.show_number(strikes)?;
    for _ in 0..RESULTS_BLINKS {
        board.clock.delay_ms(RESULTS_BLINK_MS);
        board.display.clear()?;
        board.clock.delay_ms(RESULTS_BLINK_MS);
        board.display.show_number(strikes)?;
    }
    Ok(())
}
