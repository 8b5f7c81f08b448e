//! Registry of the supported panel models
//!
//! Every model is a [`PanelDescriptor`] in static memory. Adding a model only
//! means adding a descriptor and a [`Model`] variant.

use crate::descriptor::PanelDescriptor;

mod lut;
pub mod ssd16xx;
pub mod uc81xx;

pub use ssd16xx::{EPD1IN54B_V2, EPD1IN54_V2, EPD2IN13_V2, EPD2IN13_V3, EPD5IN79};
pub use uc81xx::{
    EPD2IN13G, EPD2IN66G, EPD2IN7, EPD3IN97G, EPD4IN01F, EPD7IN3F, EPD7IN3G, EPD7IN5,
    EPD7IN5B_V2,
};

/// Supported panel models
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Model {
    /// 1.54" V2, 200x200, black/white
    Epd1in54V2,
    /// 1.54" B V2, 200x200, black/white/red
    Epd1in54bV2,
    /// 2.13" V2, 128x250, black/white
    Epd2in13V2,
    /// 2.13" V3, 122x250, black/white
    Epd2in13V3,
    /// 2.7", 176x264, black/white
    Epd2in7,
    /// 5.79", 792x272, black/white, two controllers
    Epd5in79,
    /// 7.5" V1, 640x384, black/white at 4 bits per pixel
    Epd7in5,
    /// 7.5" B V2, 800x480, black/white/red
    Epd7in5bV2,
    /// 4.01" F, 640x400, 7 colors
    Epd4in01f,
    /// 7.3" F, 800x480, 7 colors
    Epd7in3f,
    /// 7.3" G, 800x480, 4 colors
    Epd7in3g,
    /// 2.13" G, 128x250, 4 colors
    Epd2in13g,
    /// 2.66" G, 184x360, 4 colors
    Epd2in66g,
    /// 3.97" G, 800x480, 4 colors
    Epd3in97g,
}

impl Model {
    /// All models, in registry order
    pub const ALL: [Model; 14] = [
        Model::Epd1in54V2,
        Model::Epd1in54bV2,
        Model::Epd2in13V2,
        Model::Epd2in13V3,
        Model::Epd2in7,
        Model::Epd5in79,
        Model::Epd7in5,
        Model::Epd7in5bV2,
        Model::Epd4in01f,
        Model::Epd7in3f,
        Model::Epd7in3g,
        Model::Epd2in13g,
        Model::Epd2in66g,
        Model::Epd3in97g,
    ];

    /// The static description of the model
    pub fn descriptor(self) -> &'static PanelDescriptor {
        match self {
            Model::Epd1in54V2 => &EPD1IN54_V2,
            Model::Epd1in54bV2 => &EPD1IN54B_V2,
            Model::Epd2in13V2 => &EPD2IN13_V2,
            Model::Epd2in13V3 => &EPD2IN13_V3,
            Model::Epd2in7 => &EPD2IN7,
            Model::Epd5in79 => &EPD5IN79,
            Model::Epd7in5 => &EPD7IN5,
            Model::Epd7in5bV2 => &EPD7IN5B_V2,
            Model::Epd4in01f => &EPD4IN01F,
            Model::Epd7in3f => &EPD7IN3F,
            Model::Epd7in3g => &EPD7IN3G,
            Model::Epd2in13g => &EPD2IN13G,
            Model::Epd2in66g => &EPD2IN66G,
            Model::Epd3in97g => &EPD3IN97G,
        }
    }

    /// Looks a model up by its descriptor name, e.g. `"epd7in3f"`
    pub fn from_name(name: &str) -> Option<Model> {
        Model::ALL
            .into_iter()
            .find(|model| model.descriptor().name.eq_ignore_ascii_case(name))
    }
}
