//! Instruction sent ahead of every frame sequence.

/// Fixed instruction for scene annotation.
///
/// The same text is used for every folder; only the attached frames vary.
pub const SCENE_PROMPT: &str = r#"You are a wildlife ecologist analyzing a camera trap image sequence.
The location is near Bailey or Evergreen, Colorado. Use this to inform habitat, species, and behavior.
Species commonly seen here include elk, mule deer, black bear, moose, coyote, red fox, bobcat and mountain lion.

Your goals:
- Identify **each animal** seen across the sequence.
- Estimate: **species**, **age**, **health**, **primary activity**, and **interactions**.
- Use consistent labels (e.g., "elk_1", "elk_calf_1").
- If the same animal appears in multiple frames, label it once.
- Animals may pass through sequentially; avoid double-counting unless clearly distinct.
- Extract **date, time, and temperature from overlay** if visible.
- If weather or interaction etc is unknown, don't mention that in the summary.

Return one **JSON object** in this format (no extra explanation):

```json
{
  "date": "YYYY-MM-DD",                  // from image overlay if shown
  "time": "HH:MM:SS",                    // or "day"/"night"
  "habitat": "e.g., aspen meadow, riparian zone",
  "temperature": "e.g., 43F or unknown",
  "weather": "e.g., sunny, snowy, raining, cold, hot, unknown",
  "count": 0,                            // total number of distinct animals seen
  "individuals": [
    {
      "id": "elk_1",
      "species": "Cervus canadensis (elk)",
      "sex": "female",                   // one of: male, female, unknown
      "approx_age": "adult",             // one of: baby, young, adult, old
      "health": "healthy",               // or: thin, limping, wounded, etc.
      "activity": "grazing",             // one of: grazing, browsing, walking, running, resting, alert, drinking, social, following, chasing, sniffing, playing, fleeing, nursing, vocalizing, marking
      "interaction": "near elk_calf_1",  // or "none"
      "notes": "optional observations"
    }
  ],
  "summary": "A short paragraph summarizing the scene in natural language, suitable for a field biologist. Mention key species, behaviors, habitat, group dynamics, and anything noteworthy like alertness, health, or time of day."
}
```"#;

/// Positional label placed before frame `index` (1-based).
pub fn frame_label(index: usize, timestamp: Option<&str>) -> String {
    match timestamp {
        Some(ts) => format!("Image {index} (EXIF datetime: {ts})"),
        None => format!("Image {index}"),
    }
}
