pub mod background;
pub mod dialog;
pub mod flashback;
pub mod full_color;
pub mod fullscreen_text;
pub mod layer;
pub mod node;
pub mod scene_effect;
pub mod sekai;
pub mod stack;
pub mod telop;
pub mod wipe;
